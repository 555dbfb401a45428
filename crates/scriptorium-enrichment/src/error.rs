//! Error types for LLM request completion and batch enrichment.

use scriptorium_common::{impl_common_conversions, CommonError};
use thiserror::Error;

pub type EnrichmentResult<T> = Result<T, EnrichmentError>;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// A single request to the provider failed (HTTP error, timeout, malformed response).
    #[error("request failed: {0}")]
    Request(String),

    /// The batch's overall failure rate exceeded the configured threshold.
    #[error("failure rate {rate} exceeded max_failure_rate {threshold}")]
    FailureRateExceeded { rate: f64, threshold: f64 },

    #[error("IO error: {0}")]
    Io(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("other error: {0}")]
    Other(String),
}

impl CommonError for EnrichmentError {
    fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    fn config_error(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    fn other_error(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl_common_conversions!(EnrichmentError, with_serde);

impl From<reqwest::Error> for EnrichmentError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}
