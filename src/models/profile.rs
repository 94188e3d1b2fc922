use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use super::{EngagementRecord, UserPreferences};

/// Event profile of a single user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserEventProfile {
    pub user_id: String,
    #[serde(default)]
    pub attended_events: BTreeSet<String>,
    #[serde(flatten)]
    pub preferences: UserPreferences,
    #[serde(default)]
    pub engagement_log: Vec<EngagementRecord>,
}

impl UserEventProfile {
    /// Creates an empty profile for a user
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            attended_events: BTreeSet::new(),
            preferences: UserPreferences::default(),
            engagement_log: Vec::new(),
        }
    }

    /// Appends a record to the log
    ///
    /// Attendance and registration also put the event in the attended set.
    pub fn record(&mut self, record: EngagementRecord) {
        if record.action.marks_attendance() && !self.attended_events.contains(&record.event_id) {
            self.attended_events.insert(record.event_id.clone());
        }
        self.engagement_log.push(record);
    }

    /// Replaces the declared preferences, leaving history untouched
    pub fn set_preferences(&mut self, preferences: UserPreferences) {
        self.preferences = preferences;
    }

    pub fn has_attended(&self, event_id: &str) -> bool {
        self.attended_events.contains(event_id)
    }

    /// Evicts the oldest records until at most `max_records` remain
    ///
    /// The latest attendance record of every attended event is never evicted,
    /// so the log can stay above the cap when those alone exceed it.
    /// Returns the number of evicted records.
    pub fn enforce_retention(&mut self, max_records: usize) -> usize {
        let len = self.engagement_log.len();
        if len <= max_records {
            return 0;
        }

        let mut pinned: HashSet<usize> = HashSet::new();
        {
            let mut seen: HashSet<&str> = HashSet::new();
            for (index, record) in self.engagement_log.iter().enumerate().rev() {
                if record.action.marks_attendance()
                    && self.attended_events.contains(&record.event_id)
                    && seen.insert(record.event_id.as_str())
                {
                    pinned.insert(index);
                }
            }
        }

        let mut excess = len - max_records;
        let mut index = 0;
        self.engagement_log.retain(|_| {
            let evict = excess > 0 && !pinned.contains(&index);
            if evict {
                excess -= 1;
            }
            index += 1;
            !evict
        });

        len - self.engagement_log.len()
    }

    /// Checks that every attended event is backed by an attendance record
    pub fn attendance_is_logged(&self) -> bool {
        self.attended_events.iter().all(|event_id| {
            self.engagement_log
                .iter()
                .any(|r| &r.event_id == event_id && r.action.marks_attendance())
        })
    }
}
