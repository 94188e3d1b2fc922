use std::collections::HashMap;

use crate::models::{rank, Recommendation, RecommendationSource, UserEventProfile};

use super::similarity::user_similarity;
use super::{Scorer, ScoringContext};

/// Users must be strictly more similar than this to contribute
pub const SIMILARITY_THRESHOLD: f64 = 0.3;
/// Number of similar users considered per request
pub const MAX_SIMILAR_USERS: usize = 10;
/// Share of a similar user's similarity credited to each event they attended
pub const CONTRIBUTION_WEIGHT: f64 = 0.8;

const SIMILAR_USERS_REASON: &str = "Attended by users with similar taste";
const NETWORK_REASON: &str = "Attended by someone in your network";

/// Recommends events attended by users similar to the target
#[derive(Debug, Clone, Default)]
pub struct CollaborativeScorer;

impl CollaborativeScorer {
    pub fn new() -> Self {
        Self
    }

    /// The most similar other users above the threshold, best first
    ///
    /// Equal similarities fall back to ascending user id.
    pub fn similar_users<'a>(&self, ctx: &'a ScoringContext) -> Vec<(&'a UserEventProfile, f64)> {
        let mut similar: Vec<(&UserEventProfile, f64)> = ctx
            .others()
            .map(|other| (other, user_similarity(&ctx.target, other)))
            .filter(|(_, similarity)| *similarity > SIMILARITY_THRESHOLD)
            .collect();

        similar.sort_by(|(a, sim_a), (b, sim_b)| {
            sim_b
                .total_cmp(sim_a)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        similar.truncate(MAX_SIMILAR_USERS);
        similar
    }
}

impl Scorer for CollaborativeScorer {
    fn source(&self) -> RecommendationSource {
        RecommendationSource::Collaborative
    }

    fn score(&self, ctx: &ScoringContext, limit: usize) -> Vec<Recommendation> {
        let similar = self.similar_users(ctx);
        if similar.is_empty() {
            tracing::debug!(user_id = %ctx.target.user_id, "No similar users found");
            return Vec::new();
        }

        let connections = &ctx.target.preferences.social_connections;
        let mut accumulated: HashMap<&str, Recommendation> = HashMap::new();

        for (other, similarity) in &similar {
            let in_network = connections.contains(&other.user_id);

            for event_id in &other.attended_events {
                if ctx.target.has_attended(event_id) {
                    continue;
                }
                if !accumulated.contains_key(event_id.as_str())
                    && accumulated.len() >= ctx.max_candidates
                {
                    continue;
                }

                let rec = accumulated
                    .entry(event_id.as_str())
                    .or_insert_with(|| Recommendation::new(event_id.as_str(), self.source()));
                rec.add(similarity * CONTRIBUTION_WEIGHT, SIMILAR_USERS_REASON);
                if in_network {
                    rec.add_reason(NETWORK_REASON);
                }
            }
        }

        tracing::debug!(
            user_id = %ctx.target.user_id,
            similar_users = similar.len(),
            candidates = accumulated.len(),
            "Collaborative scoring complete"
        );

        let scored = accumulated.into_values().map(Recommendation::finalize).collect();
        rank(scored, limit)
    }

    fn name(&self) -> &'static str {
        "collaborative"
    }
}
