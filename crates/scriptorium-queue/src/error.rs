//! Error taxonomy for the task queue and everything dispatched through it.
//!
//! `TaskError` realizes the queue worker's error classification: the worker
//! never inspects a handler's original error type, only this enum's
//! `is_retryable()` to decide Ack/Nack/Status-`failed`.

use scriptorium_common::{impl_common_conversions, CommonError};
use thiserror::Error;

pub type TaskQueueResult<T> = Result<T, TaskError>;

#[derive(Debug, Error)]
pub enum TaskError {
    /// A task payload was missing a field or had the wrong type. Permanent.
    #[error("payload decode error: {0}")]
    PayloadDecode(String),

    /// A referenced repository/commit/enrichment does not exist.
    /// `permanent` distinguishes a structural data bug (no retry) from a
    /// likely orchestration race (retryable).
    #[error("not found: {message}")]
    NotFound { permanent: bool, message: String },

    /// A precondition the task assumed was never committed, e.g. a
    /// repository with no working copy. Permanent; signals an
    /// orchestration error upstream.
    #[error("uncommitted precondition: {0}")]
    UncommitedPrecondition(String),

    /// DB deadlock, network blip, LLM 5xx, git transient. Retryable with
    /// exponential backoff.
    #[error("transient error: {0}")]
    Transient(String),

    /// Enrichment failure rate exceeded `threshold`. Task fails and is
    /// retried per policy.
    #[error("enrichment failure budget exceeded: rate {rate} > threshold {threshold}")]
    EnrichmentFailureBudgetExceeded { rate: f64, threshold: f64 },

    /// No handler registered for the task's operation. Permanent.
    #[error("no handler for operation: {0}")]
    NoHandler(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("other error: {0}")]
    Other(String),
}

impl TaskError {
    /// Maps directly to spec §7's propagation rule: whether the worker
    /// should `Nack` (retry, subject to the task's own retry bound) or
    /// treat the failure as permanent.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::NotFound { permanent, .. } => !*permanent,
            Self::Transient(_) | Self::EnrichmentFailureBudgetExceeded { .. } => true,
            Self::PayloadDecode(_)
            | Self::UncommitedPrecondition(_)
            | Self::NoHandler(_)
            | Self::Io(_)
            | Self::Configuration(_)
            | Self::Parse(_)
            | Self::Other(_) => false,
        }
    }
}

impl CommonError for TaskError {
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

impl_common_conversions!(TaskError, with_serde);

impl From<sqlx::Error> for TaskError {
    fn from(err: sqlx::Error) -> Self {
        Self::Transient(err.to_string())
    }
}

impl From<scriptorium_meta_data::MetaDataError> for TaskError {
    fn from(err: scriptorium_meta_data::MetaDataError) -> Self {
        Self::Transient(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_not_found_is_not_retryable() {
        let err = TaskError::NotFound {
            permanent: true,
            message: "commit missing".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn transient_not_found_is_retryable() {
        let err = TaskError::NotFound {
            permanent: false,
            message: "repository not yet cloned".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn no_handler_is_permanent() {
        assert!(!TaskError::NoHandler("bogus.op".to_string()).is_retryable());
    }

    #[test]
    fn budget_exceeded_is_retryable() {
        let err = TaskError::EnrichmentFailureBudgetExceeded {
            rate: 0.3,
            threshold: 0.05,
        };
        assert!(err.is_retryable());
    }
}
