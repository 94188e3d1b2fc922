use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::TimeOfDay;

/// Where an event takes place
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub city: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

/// Feature record for a single event, as supplied by the catalog feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventFeatures {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub location: Location,
    /// Local start time at the venue
    pub starts_at: NaiveDateTime,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub registered: u32,
    #[serde(default)]
    pub organizer: String,
    #[serde(default)]
    pub description: String,
    /// Popularity in [0, 1]
    #[serde(default)]
    pub popularity: f64,
    /// Average rating in [0, 5]
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub review_count: u32,
}

impl EventFeatures {
    /// Fraction of capacity already taken. Zero-capacity events have no pressure.
    pub fn registration_pressure(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.registered as f64 / self.capacity as f64
    }

    /// Time-of-day bucket the event starts in, if any
    pub fn time_of_day(&self) -> Option<TimeOfDay> {
        TimeOfDay::from_hour(self.starts_at.hour())
    }

    /// Checks that every numeric field is usable for scoring
    pub(crate) fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty()
            && self.price.is_finite()
            && self.popularity.is_finite()
            && self.average_rating.is_finite()
            && self.location.latitude.is_finite()
            && self.location.longitude.is_finite()
    }
}
