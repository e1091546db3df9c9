//! Error types for checkpoint storage operations

use thiserror::Error;

/// Result type for checkpoint operations
pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Errors that can occur inside a checkpoint store
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// Referenced checkpoint does not exist in the store
    #[error("checkpoint not found: {0}")]
    NotFound(String),

    /// Backend-specific storage failure
    #[error("storage error: {0}")]
    Storage(String),
}
