use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::Recommendation,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
}

/// Handler for the recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let limit = match query.limit {
        Some(0) => {
            return Err(AppError::Validation(
                "limit must be a positive integer".to_string(),
            ))
        }
        Some(limit) => limit.min(state.max_limit),
        None => state.default_limit,
    };

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        limit,
        "Processing recommendation request"
    );

    let recommendations = state.engine.get_recommendations(&user_id, limit).await?;

    Ok(Json(recommendations))
}
