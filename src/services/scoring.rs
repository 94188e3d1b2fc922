use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::models::{Recommendation, RecommendationSource, UserEventProfile};

use super::CatalogSnapshot;

/// Everything a scorer may read for one recommendation call
///
/// Owned, so it can be shared across blocking tasks behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    pub target: UserEventProfile,
    /// Every known profile, the target included
    pub profiles: Vec<UserEventProfile>,
    pub catalog: Arc<CatalogSnapshot>,
    pub now: DateTime<Utc>,
    pub max_candidates: usize,
}

impl ScoringContext {
    /// Profiles other than the target's
    pub fn others(&self) -> impl Iterator<Item = &UserEventProfile> {
        let target_id = self.target.user_id.as_str();
        self.profiles.iter().filter(move |p| p.user_id != target_id)
    }
}

/// One independent recommendation signal
pub trait Scorer: Send + Sync {
    /// Tag carried by this scorer's output
    fn source(&self) -> RecommendationSource;

    /// Returns at most `limit` recommendations in ranking order
    fn score(&self, ctx: &ScoringContext, limit: usize) -> Vec<Recommendation>;

    /// Name for logging
    fn name(&self) -> &'static str;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::{EngagementAction, EngagementRecord, EventFeatures, UserPreferences};
    use chrono::TimeZone;

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    pub fn profile(user_id: &str, attended: &[&str], prefs: UserPreferences) -> UserEventProfile {
        let mut profile = UserEventProfile::new(user_id);
        for event_id in attended {
            profile.record(
                EngagementRecord::new(*event_id, EngagementAction::Attended, None, now()).unwrap(),
            );
        }
        profile.set_preferences(prefs);
        profile
    }

    pub fn context(
        target: &UserEventProfile,
        profiles: Vec<UserEventProfile>,
        events: Vec<EventFeatures>,
    ) -> ScoringContext {
        ScoringContext {
            target: target.clone(),
            profiles,
            catalog: Arc::new(CatalogSnapshot::new(events)),
            now: now(),
            max_candidates: 5000,
        }
    }
}
