//! Server error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dojo_agent::AgentError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// JSON body returned for request-level failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
}

#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid server configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Agent construction or run failure
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// Malformed run request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Logging could not be initialised
    #[error("Logging error: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Agent(AgentError::InvalidState(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::Agent(AgentError::Llm(_)) => "MODEL_ERROR",
            ServerError::Agent(AgentError::IterationLimit(_)) => "ITERATION_LIMIT",
            ServerError::Agent(AgentError::InvalidState(_)) => "INVALID_STATE",
            ServerError::Agent(_) => "AGENT_ERROR",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Logging(_) => "LOGGING_ERROR",
            ServerError::Io(_) => "IO_ERROR",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: self.to_string(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
