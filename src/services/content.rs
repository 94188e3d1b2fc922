use crate::models::{rank, EventFeatures, Recommendation, RecommendationSource};

use super::{Scorer, ScoringContext};

pub const CATEGORY_MATCH: f64 = 0.4;
/// Per tag shared with previously attended events
pub const TAG_MATCH: f64 = 0.1;
pub const LOCATION_MATCH: f64 = 0.2;
pub const TIME_MATCH: f64 = 0.1;
pub const HIGH_RATING_BONUS: f64 = 0.1;
pub const HIGH_RATING: f64 = 4.5;
/// Events must score strictly above this to be emitted
pub const MIN_SCORE: f64 = 0.2;

/// Scores events against a user's declared interests and attendance history
#[derive(Debug, Clone, Default)]
pub struct ContentScorer;

impl ContentScorer {
    pub fn new() -> Self {
        Self
    }

    fn score_event(
        &self,
        ctx: &ScoringContext,
        event: &EventFeatures,
        history_tags: &std::collections::BTreeSet<String>,
    ) -> Recommendation {
        let prefs = &ctx.target.preferences;
        let mut rec = Recommendation::new(event.id.as_str(), self.source());

        if prefs.interested_categories.contains(&event.category) {
            rec.add(CATEGORY_MATCH, format!("Matches your interest in {}", event.category));
        }

        let shared: Vec<&str> = event
            .tags
            .intersection(history_tags)
            .map(String::as_str)
            .collect();
        if !shared.is_empty() {
            rec.add(
                TAG_MATCH * shared.len() as f64,
                format!("Similar to events you attended ({})", shared.join(", ")),
            );
        }

        if prefs.preferred_locations.contains(&event.location.city) {
            rec.add(LOCATION_MATCH, format!("Takes place in {}", event.location.city));
        }

        if let Some(time) = event.time_of_day() {
            if prefs.preferred_times.contains(&time) {
                rec.add(TIME_MATCH, format!("Fits your preferred {} schedule", time));
            }
        }

        if event.average_rating >= HIGH_RATING {
            rec.add(
                HIGH_RATING_BONUS,
                format!("Highly rated ({:.1} stars)", event.average_rating),
            );
        }

        rec
    }
}

impl Scorer for ContentScorer {
    fn source(&self) -> RecommendationSource {
        RecommendationSource::Content
    }

    fn score(&self, ctx: &ScoringContext, limit: usize) -> Vec<Recommendation> {
        let history_tags = ctx.catalog.tags_attended_by(&ctx.target);

        let scored: Vec<Recommendation> = ctx
            .catalog
            .candidates_for(&ctx.target, ctx.max_candidates)
            .map(|event| self.score_event(ctx, event, &history_tags))
            .filter(|rec| rec.score > MIN_SCORE)
            .map(Recommendation::finalize)
            .collect();

        tracing::debug!(
            user_id = %ctx.target.user_id,
            matches = scored.len(),
            history_tags = history_tags.len(),
            "Content scoring complete"
        );

        rank(scored, limit)
    }

    fn name(&self) -> &'static str {
        "content"
    }
}
