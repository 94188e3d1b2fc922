mod engagement;
mod event;
mod profile;
mod recommendation;
mod user_preferences;

pub use engagement::{EngagementAction, EngagementRecord, MAX_RATING};
pub use event::{EventFeatures, Location};
pub use profile::UserEventProfile;
pub use recommendation::{confidence, rank, ranking_order, Recommendation, RecommendationSource};
pub use user_preferences::{TimeOfDay, UserPreferences};

#[cfg(test)]
pub(crate) use event::fixtures;
