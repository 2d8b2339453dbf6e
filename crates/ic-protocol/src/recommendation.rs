use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::appliance::{AcMode, OpeningState, SwitchState};

/// Appliance settings chosen by the model.
///
/// Only appliances present in the room are ever populated; the rest stay
/// `None` and are omitted from the wire form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplianceSettings {
    #[serde(rename = "AC_MODE", default, skip_serializing_if = "Option::is_none")]
    pub ac_mode: Option<AcMode>,
    /// Target temperature in °C (16–30).
    #[serde(rename = "AC_TEMPERATURE", default, skip_serializing_if = "Option::is_none")]
    pub ac_temperature: Option<u8>,
    /// Fan speed step (0–5).
    #[serde(rename = "CEILING_FAN", default, skip_serializing_if = "Option::is_none")]
    pub ceiling_fan: Option<u8>,
    #[serde(rename = "WINDOW", default, skip_serializing_if = "Option::is_none")]
    pub window: Option<OpeningState>,
    #[serde(rename = "DOOR", default, skip_serializing_if = "Option::is_none")]
    pub door: Option<OpeningState>,
    #[serde(rename = "EXHAUST_FAN", default, skip_serializing_if = "Option::is_none")]
    pub exhaust_fan: Option<SwitchState>,
}

/// A contract-conforming model answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Short explanation of the chosen settings.
    pub reason: String,
    #[serde(flatten)]
    pub settings: ApplianceSettings,
    /// Minutes until the model suggests re-evaluating. Advisory only.
    #[serde(rename = "RECHECK_AT")]
    pub recheck_at: u64,
}

/// A validated recommendation plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// UUIDv7, time-sortable.
    pub id: Uuid,
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub generated_at: DateTime<Utc>,
}

impl RecommendationResult {
    /// Stamp a validated recommendation with a fresh id and timestamp.
    pub fn new(recommendation: Recommendation) -> Self {
        Self {
            id: Uuid::now_v7(),
            recommendation,
            generated_at: Utc::now(),
        }
    }
}

/// Refresh cycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    #[default]
    Idle,
    Generating,
}

/// Point-in-time view of the recommendation store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    /// Last valid recommendation. Survives failed cycles.
    pub latest_recommendation: Option<RecommendationResult>,
    /// When `latest_recommendation` was stored.
    pub last_updated: Option<DateTime<Utc>>,
    pub status: CycleStatus,
    /// Cause of the most recent failed cycle, cleared on the next cycle start.
    pub error: Option<String>,
}

/// How a reader should interpret a [`StoreState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// No cycle has produced anything yet.
    Empty,
    /// Latest cycle succeeded.
    Fresh,
    /// A previous recommendation is kept but the latest cycle failed.
    Stale,
    /// Cycles have run but none succeeded.
    NeverSucceeded,
}

impl StoreState {
    pub fn freshness(&self) -> Freshness {
        match (&self.latest_recommendation, &self.error) {
            (None, None) => Freshness::Empty,
            (Some(_), None) => Freshness::Fresh,
            (Some(_), Some(_)) => Freshness::Stale,
            (None, Some(_)) => Freshness::NeverSucceeded,
        }
    }
}
