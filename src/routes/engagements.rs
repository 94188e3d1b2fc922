use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{EngagementAction, EngagementRecord},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct EngagementRequest {
    pub event_id: String,
    pub action: EngagementAction,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Handler for recording a user's engagement with an event
pub async fn record(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Json(request): Json<EngagementRequest>,
) -> AppResult<(StatusCode, Json<EngagementRecord>)> {
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        event_id = %request.event_id,
        action = %request.action,
        "Recording engagement"
    );

    let record = state
        .engine
        .record_engagement(&user_id, &request.event_id, request.action, request.rating)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}
