//! Chat endpoint.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use ic_protocol::{Intent, RecommendationResult};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(alias = "user_input")]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<RecommendationResult>,
}

/// POST /api/v1/chat - classify and answer a chat message.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".into()));
    }

    let outcome = state.router.route(message).await?;
    Ok(Json(ChatResponse {
        reply: outcome.reply().to_string(),
        intent: outcome.intent(),
        recommendation: outcome.recommendation().cloned(),
    }))
}
