//! Error types for the explorer

use thiserror::Error;

/// Failure taxonomy for explorer operations.
///
/// Nothing here is fatal: every variant is surfaced to the host as a result
/// value so the UI can retry, revert, or ignore. `MutationRejected` and
/// `Transport` both trigger an optimistic rollback; they are kept distinct
/// so transport problems can be logged separately.
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Mutation rejected: {0}")]
    MutationRejected(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for explorer operations
pub type Result<T> = std::result::Result<T, ExplorerError>;
