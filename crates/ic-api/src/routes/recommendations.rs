//! Recommendation endpoints.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use ic_protocol::{RecommendationResult, StoreState};

use crate::error::ApiResult;
use crate::normalize::RecommendationRequest;
use crate::state::AppState;

/// Response for an on-demand recommendation.
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub recommendation: RecommendationResult,
}

/// POST /api/v1/recommendations - normalize, record and recommend now.
pub async fn create_recommendation(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> ApiResult<Json<RecommendationResponse>> {
    let context = request.into_context();
    tracing::info!(
        room = context.environment.room.room_name.as_deref().unwrap_or("unnamed"),
        appliances = context.capabilities.len(),
        "on-demand recommendation requested"
    );

    let recommendation = state.advisor.recommend_now(context).await?;
    Ok(Json(RecommendationResponse {
        success: true,
        recommendation,
    }))
}

/// GET /api/v1/recommendations/latest - store snapshot as-is.
pub async fn latest(State(state): State<AppState>) -> Json<StoreState> {
    Json(state.advisor.store().snapshot().await)
}
