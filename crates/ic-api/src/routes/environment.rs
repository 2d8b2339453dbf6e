//! Shared environment endpoint.

use axum::Json;
use axum::extract::State;

use ic_advisor::RoomContext;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/v1/environment - room context the refresh loop evaluates.
pub async fn get_environment(State(state): State<AppState>) -> ApiResult<Json<RoomContext>> {
    state
        .advisor
        .environment()
        .get()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no environment has been submitted".into()))
}
