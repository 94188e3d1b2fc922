use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

/// Part of the day an event starts in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 06:00 - 11:59
    Morning,
    /// 12:00 - 17:59
    Afternoon,
    /// 18:00 - 23:59
    Evening,
}

impl TimeOfDay {
    /// Maps an hour of the day to its bucket. Hours before 06:00 have none.
    pub fn from_hour(hour: u32) -> Option<Self> {
        match hour {
            6..=11 => Some(TimeOfDay::Morning),
            12..=17 => Some(TimeOfDay::Afternoon),
            18..=23 => Some(TimeOfDay::Evening),
            _ => None,
        }
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeOfDay::Morning => write!(f, "morning"),
            TimeOfDay::Afternoon => write!(f, "afternoon"),
            TimeOfDay::Evening => write!(f, "evening"),
        }
    }
}

/// Declared preferences of a user, imported from the surrounding platform
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserPreferences {
    #[serde(default)]
    pub interested_categories: BTreeSet<String>,
    #[serde(default)]
    pub preferred_times: BTreeSet<TimeOfDay>,
    #[serde(default)]
    pub preferred_locations: BTreeSet<String>,
    #[serde(default)]
    pub social_connections: BTreeSet<String>,
}

impl UserPreferences {
    /// Creates empty preferences
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an interested category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.interested_categories.insert(category.into());
        self
    }

    /// Adds a preferred time-of-day bucket
    pub fn with_time(mut self, time: TimeOfDay) -> Self {
        self.preferred_times.insert(time);
        self
    }

    /// Adds a preferred location
    pub fn with_location(mut self, city: impl Into<String>) -> Self {
        self.preferred_locations.insert(city.into());
        self
    }

    /// Adds a social connection
    pub fn with_connection(mut self, user_id: impl Into<String>) -> Self {
        self.social_connections.insert(user_id.into());
        self
    }
}
