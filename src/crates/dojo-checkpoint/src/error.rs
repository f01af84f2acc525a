//! Error types for checkpoint operations

use thiserror::Error;

/// Result type for checkpoint operations
pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Errors that can occur while saving or loading checkpoints
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// Checkpoint not found
    #[error("Checkpoint not found: {0}")]
    NotFound(String),

    /// State could not be converted to or from checkpoint values
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Config or checkpoint is missing required fields
    #[error("Invalid checkpoint: {0}")]
    Invalid(String),
}
