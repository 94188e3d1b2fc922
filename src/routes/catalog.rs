use axum::{extract::State, Extension, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::EventFeatures,
    routes::AppState,
    services::CatalogSnapshot,
};

#[derive(Debug, Serialize)]
pub struct CatalogSummary {
    pub event_count: usize,
    pub dropped: usize,
}

impl From<&CatalogSnapshot> for CatalogSummary {
    fn from(snapshot: &CatalogSnapshot) -> Self {
        Self {
            event_count: snapshot.len(),
            dropped: snapshot.dropped(),
        }
    }
}

/// Summary of the current catalog snapshot
pub async fn summary(State(state): State<Arc<AppState>>) -> Json<CatalogSummary> {
    let snapshot = state.engine.catalog().await;
    Json(CatalogSummary::from(snapshot.as_ref()))
}

/// Replaces the catalog with the events in the request body
pub async fn replace(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(events): Json<Vec<EventFeatures>>,
) -> Json<CatalogSummary> {
    tracing::info!(
        request_id = %request_id,
        submitted = events.len(),
        "Replacing catalog"
    );

    let snapshot = state.engine.replace_catalog(events).await;
    Json(CatalogSummary::from(snapshot.as_ref()))
}

/// Pulls a fresh catalog from the configured feed
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<CatalogSummary>> {
    let feed = state
        .catalog_feed
        .clone()
        .ok_or_else(|| AppError::Validation("no catalog feed is configured".to_string()))?;

    tracing::info!(request_id = %request_id, feed = feed.name(), "Refreshing catalog");

    let snapshot = state.engine.refresh_catalog(feed.as_ref()).await?;
    Ok(Json(CatalogSummary::from(snapshot.as_ref())))
}
