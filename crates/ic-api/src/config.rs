//! API server configuration.

use serde::Deserialize;

use ic_advisor::config::{GeminiConfig, RefreshConfig};

/// Top-level API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins (e.g., ["http://localhost:5173"]). Empty allows any.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Seed the shared environment with the built-in sample room.
    #[serde(default)]
    pub sample_data: bool,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            sample_data: false,
            gemini: GeminiConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Overlay settings from environment variables.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overlay settings from `lookup` (`GEMINI_API_KEY`, `GEMINI_MODEL`,
    /// `IC_REFRESH_INTERVAL_SECS`, `IC_PORT`, `IC_SAMPLE_DATA`). Unparseable
    /// numbers are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.gemini.api_key = key;
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(raw) = lookup("IC_REFRESH_INTERVAL_SECS") {
            match raw.parse() {
                Ok(secs) => self.refresh.interval_secs = secs,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid IC_REFRESH_INTERVAL_SECS"),
            }
        }
        if let Some(raw) = lookup("IC_PORT") {
            match raw.parse() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid IC_PORT"),
            }
        }
        if let Some(raw) = lookup("IC_SAMPLE_DATA") {
            self.sample_data = raw.eq_ignore_ascii_case("true") || raw == "1";
        }
    }
}
