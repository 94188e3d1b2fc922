use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{UserEventProfile, UserPreferences},
    routes::AppState,
};

/// Returns a user's stored profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserEventProfile>> {
    state
        .engine
        .profile(&user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no profile for user {}", user_id)))
}

/// Replaces a user's declared preferences
pub async fn update_preferences(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(preferences): Json<UserPreferences>,
) -> AppResult<Json<UserEventProfile>> {
    let profile = state.engine.update_preferences(&user_id, preferences).await?;
    Ok(Json(profile))
}
