//! Error types for agent runs.

use thiserror::Error;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors that can occur while building or running an agent
#[derive(Error, Debug)]
pub enum AgentError {
    /// Model provider error
    #[error("Model error: {0}")]
    Llm(#[from] dojo_llm::LlmError),

    /// Checkpoint store error
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] dojo_checkpoint::CheckpointError),

    /// Tool execution error
    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    /// Client-supplied state does not fit the state schema
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The run kept calling tools past the iteration limit
    #[error("Iteration limit of {0} reached without a final answer")]
    IterationLimit(usize),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
