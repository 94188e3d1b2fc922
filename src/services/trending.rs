use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::models::UserEventProfile;

/// Parameters of the recency-weighted trend signal
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSettings {
    /// Records older than this are ignored
    pub lookback: Duration,
    /// Age at which a record counts half
    pub half_life_hours: f64,
    /// Decayed mass an event needs to count as trending
    pub threshold: f64,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            lookback: Duration::hours(72),
            half_life_hours: 24.0,
            threshold: 3.0,
        }
    }
}

/// Decayed engagement mass per event, computed from every user's log
#[derive(Debug, Clone, Default)]
pub struct TrendIndex {
    mass: HashMap<String, f64>,
    threshold: f64,
}

impl TrendIndex {
    /// Sums `weight × 0.5^(age / half_life)` over recent records of all profiles
    ///
    /// Records newer than `now` or older than the lookback window are skipped.
    pub fn build<'a>(
        profiles: impl IntoIterator<Item = &'a UserEventProfile>,
        now: DateTime<Utc>,
        settings: &TrendSettings,
    ) -> Self {
        let oldest = now - settings.lookback;
        let half_life_secs = settings.half_life_hours * 3600.0;
        let mut mass: HashMap<String, f64> = HashMap::new();

        for profile in profiles {
            for record in &profile.engagement_log {
                if record.timestamp > now || record.timestamp < oldest {
                    continue;
                }
                let age_secs = (now - record.timestamp).num_seconds() as f64;
                let decay = if half_life_secs > 0.0 {
                    0.5_f64.powf(age_secs / half_life_secs)
                } else {
                    1.0
                };
                *mass.entry(record.event_id.clone()).or_insert(0.0) +=
                    record.action.trend_weight() * decay;
            }
        }

        Self {
            mass,
            threshold: settings.threshold,
        }
    }

    /// Decayed engagement mass of an event, 0 when it has none
    pub fn mass(&self, event_id: &str) -> f64 {
        self.mass.get(event_id).copied().unwrap_or(0.0)
    }

    pub fn is_trending(&self, event_id: &str) -> bool {
        let mass = self.mass(event_id);
        mass > 0.0 && mass >= self.threshold
    }
}
