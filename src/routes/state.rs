use std::sync::Arc;

use crate::db::{InMemoryProfileStore, ProfileStore};
use crate::services::{feeds::CatalogFeed, EngineSettings, RecommendationEngine};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    /// Feed used by `POST /catalog/refresh`, when one is configured
    pub catalog_feed: Option<Arc<dyn CatalogFeed>>,
    pub default_limit: usize,
    pub max_limit: usize,
}

impl AppState {
    pub fn new(engine: Arc<RecommendationEngine>) -> Self {
        Self {
            engine,
            catalog_feed: None,
            default_limit: 20,
            max_limit: 100,
        }
    }

    /// State over a fresh in-memory store with default settings
    pub fn in_memory() -> Self {
        let store: Arc<dyn ProfileStore> = Arc::new(InMemoryProfileStore::new());
        Self::new(Arc::new(RecommendationEngine::new(
            store,
            EngineSettings::default(),
        )))
    }

    pub fn with_catalog_feed(mut self, feed: Arc<dyn CatalogFeed>) -> Self {
        self.catalog_feed = Some(feed);
        self
    }

    pub fn with_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.max_limit = max_limit.max(1);
        self.default_limit = default_limit.clamp(1, self.max_limit);
        self
    }
}
