//! Catalog feed abstraction
//!
//! The event catalog is owned by an external system. A feed pulls the current
//! set of events from it so the engine can swap in a fresh snapshot. Each feed
//! returns raw entries; filtering happens when the snapshot is built.
use crate::{error::AppResult, models::EventFeatures};

pub mod http;
pub mod postgres;

pub use http::HttpCatalogFeed;
pub use postgres::PostgresCatalogFeed;

/// Source of event feature records
#[async_trait::async_trait]
pub trait CatalogFeed: Send + Sync {
    /// Fetch the complete current catalog
    async fn fetch_events(&self) -> AppResult<Vec<EventFeatures>>;

    /// Feed name for logging
    fn name(&self) -> &'static str;
}
