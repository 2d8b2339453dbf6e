//! API route definitions and router builder.

pub mod chat;
pub mod environment;
pub mod health;
pub mod recommendations;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the Axum router with all routes and middleware, allowing any origin.
pub fn build_router(state: AppState) -> Router {
    router_with_cors(state, &[])
}

/// Build the router, restricting CORS to `origins` when non-empty.
pub fn router_with_cors(state: AppState, origins: &[String]) -> Router {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let cors = if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        cors.allow_origin(allowed)
    };

    let api = Router::new()
        // Recommendation endpoints
        .route(
            "/recommendations",
            post(recommendations::create_recommendation),
        )
        .route("/recommendations/latest", get(recommendations::latest))
        // Chat
        .route("/chat", post(chat::chat))
        // Shared environment
        .route("/environment", get(environment::get_environment));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
