//! Indoor Comfort API - appliance recommendation and chat server.
//!
//! Serves recommendations for the most recently submitted room and keeps
//! them fresh with a background refresh loop.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ic_advisor::{GeminiClient, refresh};
use ic_api::config::ApiConfig;
use ic_api::routes;
use ic_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ic-api starting");

    let mut config = match std::env::args().nth(1) {
        Some(path) => ApiConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => ApiConfig::default(),
    };
    config.apply_env();

    if config.gemini.api_key.trim().is_empty() {
        anyhow::bail!("missing Gemini API key: set GEMINI_API_KEY or gemini.api_key");
    }

    let model = Arc::new(GeminiClient::new(config.gemini.clone())?);
    let state = if config.sample_data {
        tracing::warn!("seeding shared environment with sample data");
        AppState::with_sample_data(model)
    } else {
        AppState::new(model)
    };

    if config.refresh.enabled {
        let interval = config.refresh.interval();
        tracing::info!(interval_secs = interval.as_secs(), "refresh loop enabled");
        tokio::spawn(refresh::run(state.advisor.clone(), interval));
    } else {
        tracing::info!("refresh loop disabled");
    }

    let app = routes::router_with_cors(state, &config.cors_origins);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, model = %config.gemini.model, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
