use std::collections::{BTreeMap, BTreeSet};

use crate::models::{EventFeatures, UserEventProfile, MAX_RATING};

/// Immutable view of the event catalog used for one or more scoring calls
///
/// Events are kept in ascending id order, so iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    events: BTreeMap<String, EventFeatures>,
    dropped: usize,
}

impl CatalogSnapshot {
    /// Builds a snapshot from raw feed entries
    ///
    /// Entries with a blank id or non-finite numbers are dropped. Popularity and
    /// rating are clamped to their ranges. The last entry wins on duplicate ids.
    pub fn new(events: Vec<EventFeatures>) -> Self {
        let mut by_id = BTreeMap::new();
        let mut dropped = 0;

        for mut event in events {
            if !event.is_well_formed() {
                dropped += 1;
                continue;
            }
            event.popularity = event.popularity.clamp(0.0, 1.0);
            event.average_rating = event.average_rating.clamp(0.0, MAX_RATING);
            by_id.insert(event.id.clone(), event);
        }

        if dropped > 0 {
            tracing::warn!(dropped, kept = by_id.len(), "Dropped malformed catalog entries");
        }

        Self {
            events: by_id,
            dropped,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of feed entries rejected when the snapshot was built
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn get(&self, event_id: &str) -> Option<&EventFeatures> {
        self.events.get(event_id)
    }

    /// All events in ascending id order
    pub fn events(&self) -> impl Iterator<Item = &EventFeatures> {
        self.events.values()
    }

    /// Events a user has not attended yet, at most `max` of them
    pub fn candidates_for<'a>(
        &'a self,
        profile: &'a UserEventProfile,
        max: usize,
    ) -> impl Iterator<Item = &'a EventFeatures> + 'a {
        self.events
            .values()
            .filter(move |event| !profile.has_attended(&event.id))
            .take(max)
    }

    /// Union of the tags of every catalog event the user attended
    pub fn tags_attended_by(&self, profile: &UserEventProfile) -> BTreeSet<String> {
        profile
            .attended_events
            .iter()
            .filter_map(|event_id| self.events.get(event_id))
            .flat_map(|event| event.tags.iter().cloned())
            .collect()
    }
}
