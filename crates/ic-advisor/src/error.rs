//! Failure taxonomy for model-backed operations.

use serde::Serialize;
use thiserror::Error;

/// Contract violations found while validating a parsed model answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("missing field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` must be {expected}, got {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("field `{field}` = {value} is outside {}", range_text(.min, .max))]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: Option<i64>,
    },

    #[error("field `{field}` = \"{value}\" is not one of {allowed:?}")]
    UnknownVariant {
        field: String,
        value: String,
        allowed: &'static [&'static str],
    },
}

fn range_text(min: &i64, max: &Option<i64>) -> String {
    match max {
        Some(max) => format!("{min}..={max}"),
        None => format!("{min}.."),
    }
}

/// Why a recommendation, classification, or chat call failed.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// The model call failed, timed out, or returned nothing.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response held no recoverable JSON object.
    #[error("parse error: {0}")]
    Parse(String),

    /// The parsed object violates the contract.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Discriminant of [`AdvisorError`], for logs and API bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Parse,
    Validation,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Transport => f.write_str("transport"),
            FailureKind::Parse => f.write_str("parse"),
            FailureKind::Validation => f.write_str("validation"),
        }
    }
}

const EMPTY_RESPONSE: &str = "model returned an empty response";

impl AdvisorError {
    /// Transport failure for a reply with no text.
    pub fn empty_response() -> Self {
        AdvisorError::Transport(EMPTY_RESPONSE.into())
    }

    pub fn is_empty_response(&self) -> bool {
        matches!(self, AdvisorError::Transport(msg) if msg == EMPTY_RESPONSE)
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            AdvisorError::Transport(_) => FailureKind::Transport,
            AdvisorError::Parse(_) => FailureKind::Parse,
            AdvisorError::Validation(_) => FailureKind::Validation,
        }
    }

    /// The message without the kind prefix.
    pub fn detail(&self) -> String {
        match self {
            AdvisorError::Transport(msg) | AdvisorError::Parse(msg) => msg.clone(),
            AdvisorError::Validation(err) => err.to_string(),
        }
    }
}

impl From<reqwest::Error> for AdvisorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdvisorError::Transport(format!("model request timed out: {err}"))
        } else {
            AdvisorError::Transport(format!("model request failed: {err}"))
        }
    }
}

/// Convenience alias for advisor results.
pub type AdvisorResult<T> = Result<T, AdvisorError>;
