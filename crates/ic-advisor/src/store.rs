//! Recommendation store: latest valid result plus cycle status.
//!
//! All four fields live behind one `RwLock` and every transition happens
//! under a single write guard, so a reader's snapshot is never a mix of
//! pre- and post-update values. The lock is only held for the transition
//! itself, never across a model call.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use ic_protocol::{CycleStatus, RecommendationResult, StoreState};
use tokio::sync::RwLock;

use crate::error::AdvisorError;

/// Shared handle to the store; clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecommendationStore {
    state: Arc<RwLock<StoreState>>,
}

impl RecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent point-in-time copy of the whole state.
    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }

    /// `idle → generating`: clear the previous error.
    pub async fn begin_cycle(&self) {
        let mut state = self.state.write().await;
        state.status = CycleStatus::Generating;
        state.error = None;
    }

    /// `generating → idle` on success: replace the recommendation atomically.
    pub async fn complete(&self, result: RecommendationResult) {
        let mut state = self.state.write().await;
        state.latest_recommendation = Some(result);
        state.last_updated = Some(Utc::now());
        state.status = CycleStatus::Idle;
        state.error = None;
    }

    /// `generating → idle` on failure: keep the previous recommendation and
    /// record the cause.
    pub async fn fail(&self, error: &AdvisorError, at: DateTime<Utc>) {
        let mut state = self.state.write().await;
        state.status = CycleStatus::Idle;
        state.error = Some(failure_message(error, at));
    }
}

/// Human-readable failure cause with its timestamp.
pub fn failure_message(error: &AdvisorError, at: DateTime<Utc>) -> String {
    format!(
        "{} failure at {}: {}",
        error.kind(),
        at.to_rfc3339_opts(SecondsFormat::Secs, true),
        error.detail()
    )
}
