use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which signal produced a recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Collaborative,
    Content,
    Popularity,
    /// More than one signal contributed
    Hybrid,
}

/// A ranked event suggestion with the reasons behind it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub event_id: String,
    pub score: f64,
    pub reasons: Vec<String>,
    pub source: RecommendationSource,
    pub confidence: f64,
}

impl Recommendation {
    /// Creates an empty recommendation for an event
    pub fn new(event_id: impl Into<String>, source: RecommendationSource) -> Self {
        Self {
            event_id: event_id.into(),
            score: 0.0,
            reasons: Vec::new(),
            source,
            confidence: 0.0,
        }
    }

    /// Adds to the score and records why
    pub fn add(&mut self, amount: f64, reason: impl Into<String>) {
        self.score += amount;
        self.add_reason(reason);
    }

    /// Appends a reason unless it is already present
    pub fn add_reason(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
    }

    /// Recomputes confidence from the current score
    pub fn finalize(mut self) -> Self {
        self.confidence = confidence(self.score);
        self
    }
}

/// Maps a raw score into [0, 1]
pub fn confidence(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

/// Ranking order: higher score first, then ascending event id
pub fn ranking_order(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.event_id.cmp(&b.event_id))
}

/// Sorts into ranking order and keeps the first `limit`
pub fn rank(mut recommendations: Vec<Recommendation>, limit: usize) -> Vec<Recommendation> {
    recommendations.sort_by(ranking_order);
    recommendations.truncate(limit);
    recommendations
}
