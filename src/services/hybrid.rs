use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{rank, Recommendation, RecommendationSource};

use super::{CollaborativeScorer, ContentScorer, PopularityScorer, Scorer, ScoringContext};

/// Multipliers applied to each signal when merging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridWeights {
    pub collaborative: f64,
    pub content: f64,
    pub popularity: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            collaborative: 1.2,
            content: 1.0,
            popularity: 0.8,
        }
    }
}

/// Per-scorer caps derived from the requested limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubLimits {
    pub collaborative: usize,
    pub content: usize,
    pub popularity: usize,
}

impl SubLimits {
    /// 40% / 40% / 20% of the limit, each rounded up
    ///
    /// Split into whole fifths and a remainder so large limits cannot overflow.
    pub fn for_limit(limit: usize) -> Self {
        let two_fifths = limit / 5 * 2 + (limit % 5 * 2).div_ceil(5);
        Self {
            collaborative: two_fifths,
            content: two_fifths,
            popularity: limit.div_ceil(5),
        }
    }
}

/// Output of the three scorers for one request
#[derive(Debug, Clone, Default)]
pub struct ScorerOutputs {
    pub collaborative: Vec<Recommendation>,
    pub content: Vec<Recommendation>,
    pub popularity: Vec<Recommendation>,
}

/// Runs the three scorers and merges their output into one ranking
#[derive(Clone)]
pub struct HybridAggregator {
    collaborative: Arc<dyn Scorer>,
    content: Arc<dyn Scorer>,
    popularity: Arc<dyn Scorer>,
    weights: HybridWeights,
}

impl HybridAggregator {
    /// Aggregator over the given scorers, in collaborative, content, popularity order
    pub fn new(
        collaborative: impl Scorer + 'static,
        content: impl Scorer + 'static,
        popularity: impl Scorer + 'static,
    ) -> Self {
        Self {
            collaborative: Arc::new(collaborative),
            content: Arc::new(content),
            popularity: Arc::new(popularity),
            weights: HybridWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: HybridWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Scores and merges on the calling thread
    pub fn recommend(&self, ctx: &ScoringContext, limit: usize) -> Vec<Recommendation> {
        if limit == 0 {
            return Vec::new();
        }
        let sub = SubLimits::for_limit(limit);
        let outputs = ScorerOutputs {
            collaborative: self.collaborative.score(ctx, sub.collaborative),
            content: self.content.score(ctx, sub.content),
            popularity: self.popularity.score(ctx, sub.popularity),
        };
        self.merge(&outputs, limit)
    }

    /// Scores on the blocking pool, one task per scorer, then merges
    ///
    /// A scorer that misses `timeout` or panics contributes nothing, so the
    /// result may be partial but is always a valid ranking.
    pub async fn recommend_concurrent(
        &self,
        ctx: Arc<ScoringContext>,
        limit: usize,
        timeout: Option<Duration>,
    ) -> Vec<Recommendation> {
        if limit == 0 {
            return Vec::new();
        }
        let sub = SubLimits::for_limit(limit);

        let (collaborative, content, popularity) = tokio::join!(
            run_scorer(self.collaborative.clone(), ctx.clone(), sub.collaborative, timeout),
            run_scorer(self.content.clone(), ctx.clone(), sub.content, timeout),
            run_scorer(self.popularity.clone(), ctx.clone(), sub.popularity, timeout),
        );

        let outputs = ScorerOutputs {
            collaborative,
            content,
            popularity,
        };
        self.merge(&outputs, limit)
    }

    /// Merges scorer output by event id into fresh accumulator entries
    ///
    /// Collaborative results go in first. Content and popularity results
    /// either add to an existing entry, which then becomes `hybrid`, or start
    /// a new one. Scorer output is only read, never modified.
    pub fn merge(&self, outputs: &ScorerOutputs, limit: usize) -> Vec<Recommendation> {
        let mut merged: HashMap<&str, Recommendation> = HashMap::new();

        let layers = [
            (&outputs.collaborative, self.weights.collaborative),
            (&outputs.content, self.weights.content),
            (&outputs.popularity, self.weights.popularity),
        ];

        for (results, weight) in layers {
            for result in results {
                let contribution = result.score * weight;
                match merged.get_mut(result.event_id.as_str()) {
                    Some(entry) => {
                        entry.score += contribution;
                        for reason in &result.reasons {
                            entry.add_reason(reason.as_str());
                        }
                        entry.source = RecommendationSource::Hybrid;
                    }
                    None => {
                        let mut entry = Recommendation::new(result.event_id.as_str(), result.source);
                        entry.score = contribution;
                        for reason in &result.reasons {
                            entry.add_reason(reason.as_str());
                        }
                        merged.insert(result.event_id.as_str(), entry);
                    }
                }
            }
        }

        let finalized = merged.into_values().map(Recommendation::finalize).collect();
        rank(finalized, limit)
    }
}

impl Default for HybridAggregator {
    fn default() -> Self {
        Self::new(
            CollaborativeScorer::new(),
            ContentScorer::new(),
            PopularityScorer::default(),
        )
    }
}

async fn run_scorer(
    scorer: Arc<dyn Scorer>,
    ctx: Arc<ScoringContext>,
    limit: usize,
    timeout: Option<Duration>,
) -> Vec<Recommendation> {
    let name = scorer.name();
    // A timed-out task is detached, not cancelled: it keeps its blocking
    // thread until the scorer returns. Candidate caps bound how long that is.
    let task = tokio::task::spawn_blocking(move || scorer.score(&ctx, limit));

    let joined = match timeout {
        Some(timeout) => match tokio::time::timeout(timeout, task).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!(
                    scorer = name,
                    timeout_ms = timeout.as_millis() as u64,
                    "Scorer timed out, continuing without it"
                );
                return Vec::new();
            }
        },
        None => task.await,
    };

    match joined {
        Ok(results) => results,
        Err(e) => {
            tracing::error!(scorer = name, error = %e, "Scorer task failed");
            Vec::new()
        }
    }
}
