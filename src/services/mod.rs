pub mod catalog;
pub mod collaborative;
pub mod content;
pub mod engine;
pub mod feeds;
pub mod hybrid;
pub mod popularity;
pub mod scoring;
pub mod similarity;
pub mod trending;

pub use catalog::CatalogSnapshot;
pub use collaborative::CollaborativeScorer;
pub use content::ContentScorer;
pub use engine::{spawn_catalog_refresh, EngineSettings, RecommendationEngine};
pub use hybrid::{HybridAggregator, HybridWeights, ScorerOutputs, SubLimits};
pub use popularity::PopularityScorer;
pub use scoring::{Scorer, ScoringContext};
pub use similarity::{jaccard, user_similarity};
pub use trending::{TrendIndex, TrendSettings};
