//! Error types for column sorting

use thiserror::Error;

/// Result type alias for column sorting operations
pub type SortResult<T> = Result<T, SortError>;

/// Errors raised by the sorting engine.
///
/// An invalid sort request is not an error; it is reported through
/// [`SortOutcome::Rejected`](crate::SortOutcome::Rejected).
#[derive(Debug, Error)]
pub enum SortError {
    #[error("Host contract violated: {0}")]
    HostContract(String),

    #[error("Invalid sort direction: {0}")]
    InvalidDirection(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
