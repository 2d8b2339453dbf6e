//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /health - liveness check plus the refresh cycle status.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.advisor.store().snapshot().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "cycle": snapshot.status,
        "freshness": snapshot.freshness(),
    }))
}
