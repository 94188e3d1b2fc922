use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{AppError, AppResult};

/// Highest rating a user can give
pub const MAX_RATING: f64 = 5.0;

/// What a user did with an event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EngagementAction {
    Viewed,
    Saved,
    Registered,
    Attended,
    Rated,
}

impl EngagementAction {
    /// Whether this action puts the event into the user's attended set
    pub fn marks_attendance(self) -> bool {
        match self {
            EngagementAction::Registered | EngagementAction::Attended => true,
            EngagementAction::Viewed | EngagementAction::Saved | EngagementAction::Rated => false,
        }
    }

    /// Contribution of one record of this action to an event's trend mass
    pub fn trend_weight(self) -> f64 {
        match self {
            EngagementAction::Viewed => 0.25,
            EngagementAction::Saved => 0.5,
            EngagementAction::Rated => 0.75,
            EngagementAction::Registered | EngagementAction::Attended => 1.0,
        }
    }
}

impl Display for EngagementAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EngagementAction::Viewed => "viewed",
            EngagementAction::Saved => "saved",
            EngagementAction::Registered => "registered",
            EngagementAction::Attended => "attended",
            EngagementAction::Rated => "rated",
        };
        write!(f, "{}", name)
    }
}

/// One immutable entry in a user's engagement log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngagementRecord {
    pub event_id: String,
    pub action: EngagementAction,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl EngagementRecord {
    /// Builds a validated record
    ///
    /// `rated` requires a rating in [0, 5]. Any other action drops a supplied
    /// rating, since only rating records carry one.
    pub fn new(
        event_id: impl Into<String>,
        action: EngagementAction,
        rating: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> AppResult<Self> {
        let rating = match action {
            EngagementAction::Rated => {
                let rating = rating.ok_or_else(|| {
                    AppError::Validation("a rated engagement requires a rating".to_string())
                })?;
                if !(0.0..=MAX_RATING).contains(&rating) {
                    return Err(AppError::Validation(format!(
                        "rating must be between 0 and {}, got {}",
                        MAX_RATING, rating
                    )));
                }
                Some(rating)
            }
            _ => {
                if rating.is_some() {
                    tracing::debug!(action = %action, "Ignoring rating on non-rating engagement");
                }
                None
            }
        };

        Ok(Self {
            event_id: event_id.into(),
            action,
            timestamp,
            rating,
        })
    }
}
