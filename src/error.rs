//! Error taxonomy for provider calls and the persistence collaborator.
//!
//! Missing API keys are not errors: an absent key is a feature
//! toggle and only ever surfaces as an informational snapshot note.

use std::time::Duration;
use thiserror::Error;

/// Failure of one outbound provider call (feed search, semantic search, enrichment).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The bounded-timeout fetch expired and the in-flight request was dropped.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("http status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(err.to_string())
    }
}

/// Failure of the persistence collaborator. Always degraded to a note by callers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("write rejected: {0}")]
    Rejected(String),
}
