use crate::models::{rank, EventFeatures, Recommendation, RecommendationSource};

use super::trending::{TrendIndex, TrendSettings};
use super::{Scorer, ScoringContext};

/// Registration pressure must exceed this to count as high demand
pub const HIGH_DEMAND_PRESSURE: f64 = 0.7;
pub const HIGH_DEMAND_BONUS: f64 = 0.3;
pub const POPULARITY_WEIGHT: f64 = 0.4;
pub const TRENDING_BONUS: f64 = 0.2;
pub const WELL_REVIEWED_BONUS: f64 = 0.1;
pub const WELL_REVIEWED_RATING: f64 = 4.0;
pub const WELL_REVIEWED_COUNT: u32 = 10;
/// Events must score strictly above this to be emitted
pub const MIN_SCORE: f64 = 0.1;

/// Scores events by demand, popularity, and recent engagement
#[derive(Debug, Clone, Default)]
pub struct PopularityScorer {
    trend: TrendSettings,
}

impl PopularityScorer {
    pub fn new(trend: TrendSettings) -> Self {
        Self { trend }
    }

    fn score_event(&self, event: &EventFeatures, trends: &TrendIndex) -> Recommendation {
        let mut rec = Recommendation::new(event.id.as_str(), self.source());

        if event.registration_pressure() > HIGH_DEMAND_PRESSURE {
            rec.add(HIGH_DEMAND_BONUS, "Filling up fast");
        }

        if event.popularity > 0.0 {
            rec.add(event.popularity * POPULARITY_WEIGHT, "Popular with attendees");
        }

        if trends.is_trending(&event.id) {
            rec.add(TRENDING_BONUS, "Trending right now");
        }

        if event.average_rating >= WELL_REVIEWED_RATING && event.review_count >= WELL_REVIEWED_COUNT
        {
            rec.add(
                WELL_REVIEWED_BONUS,
                format!(
                    "Rated {:.1} across {} reviews",
                    event.average_rating, event.review_count
                ),
            );
        }

        rec
    }
}

impl Scorer for PopularityScorer {
    fn source(&self) -> RecommendationSource {
        RecommendationSource::Popularity
    }

    fn score(&self, ctx: &ScoringContext, limit: usize) -> Vec<Recommendation> {
        let trends = TrendIndex::build(&ctx.profiles, ctx.now, &self.trend);

        let scored: Vec<Recommendation> = ctx
            .catalog
            .candidates_for(&ctx.target, ctx.max_candidates)
            .map(|event| self.score_event(event, &trends))
            .filter(|rec| rec.score > MIN_SCORE)
            .map(Recommendation::finalize)
            .collect();

        tracing::debug!(
            user_id = %ctx.target.user_id,
            matches = scored.len(),
            "Popularity scoring complete"
        );

        rank(scored, limit)
    }

    fn name(&self) -> &'static str {
        "popularity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::event;
    use crate::models::{EngagementAction, EngagementRecord, UserEventProfile, UserPreferences};
    use crate::services::scoring::test_support::{context, now, profile};

    fn scorer() -> PopularityScorer {
        PopularityScorer::new(TrendSettings::default())
    }

    #[test]
    fn test_zero_capacity_adds_no_pressure() {
        let mut e = event("E1", "Tech");
        e.capacity = 0;
        e.registered = 50;
        e.popularity = 0.5;
        let user = profile("alice", &[], UserPreferences::new());
        let ctx = context(&user, vec![user.clone()], vec![e]);

        let recs = scorer().score(&ctx, 10);
        assert_eq!(recs.len(), 1);
        assert!((recs[0].score - 0.2).abs() < 1e-9);
        assert!(!recs[0].reasons.iter().any(|r| r == "Filling up fast"));
    }

    #[test]
    fn test_all_signals() {
        let mut e = event("E1", "Tech");
        e.capacity = 100;
        e.registered = 71;
        e.popularity = 1.0;
        e.average_rating = 4.2;
        e.review_count = 10;

        let user = profile("alice", &[], UserPreferences::new());
        let mut fan = UserEventProfile::new("fan");
        for _ in 0..3 {
            fan.record(
                EngagementRecord::new("E1", EngagementAction::Registered, None, now()).unwrap(),
            );
        }
        let ctx = context(&user, vec![user.clone(), fan], vec![e]);

        let recs = scorer().score(&ctx, 10);
        let rec = &recs[0];
        assert!((rec.score - 1.0).abs() < 1e-9);
        assert_eq!(rec.confidence, 1.0_f64.min(rec.score));
        assert_eq!(rec.reasons.len(), 4);
        assert_eq!(rec.reasons[2], "Trending right now");
        assert_eq!(rec.source, RecommendationSource::Popularity);
    }

    #[test]
    fn test_pressure_threshold_is_strict() {
        let mut e = event("E1", "Tech");
        e.capacity = 10;
        e.registered = 7;
        let user = profile("alice", &[], UserPreferences::new());
        let ctx = context(&user, vec![user.clone()], vec![e]);

        assert!(scorer().score(&ctx, 10).is_empty());
    }

    #[test]
    fn test_reviews_need_both_rating_and_count() {
        let mut few = event("E1", "Tech");
        few.average_rating = 4.8;
        few.review_count = 9;
        few.popularity = 0.3;
        let mut many = event("E2", "Tech");
        many.average_rating = 4.0;
        many.review_count = 120;
        many.popularity = 0.3;

        let user = profile("alice", &[], UserPreferences::new());
        let ctx = context(&user, vec![user.clone()], vec![few, many]);

        let recs = scorer().score(&ctx, 10);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].event_id, "E2");
        assert!((recs[0].score - 0.22).abs() < 1e-9);
        assert!((recs[1].score - 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_low_scores_are_not_emitted() {
        let mut e = event("E1", "Tech");
        e.popularity = 0.25;
        let user = profile("alice", &[], UserPreferences::new());
        let ctx = context(&user, vec![user.clone()], vec![e]);

        assert!(scorer().score(&ctx, 10).is_empty());
    }

    #[test]
    fn test_attended_events_are_excluded() {
        let mut e = event("E1", "Tech");
        e.popularity = 1.0;
        let user = profile("alice", &["E1"], UserPreferences::new());
        let ctx = context(&user, vec![user.clone()], vec![e]);

        assert!(scorer().score(&ctx, 10).is_empty());
    }
}
