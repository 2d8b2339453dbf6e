//! Model endpoint and refresh loop settings, loadable from TOML.

use std::time::Duration;

use serde::Deserialize;

/// Gemini `generateContent` endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// API base URL (overridden in tests with a mock server).
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Model to use for every call.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key. Usually supplied through `GEMINI_API_KEY` rather than the file.
    #[serde(default)]
    pub api_key: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Background refresh driver settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between cycle starts.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Whether the driver is spawned at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_interval_secs() -> u64 {
    120
}
fn default_enabled() -> bool {
    true
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            enabled: default_enabled(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}
