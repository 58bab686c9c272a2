//! Error types for the RDS control-plane MCP server

use std::io;

use thiserror::Error;

use crate::confirmation::ConfirmationChallenge;

/// Result type alias for the RDS control-plane MCP server
pub type Result<T> = std::result::Result<T, Error>;

/// Internal server errors
///
/// These are the raw failures an operation can produce. They never reach the
/// caller directly; the normalization boundary in [`crate::normalize`] maps
/// every variant to a stable user-facing kind and message.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single invalid argument
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Multiple or combined invalid arguments
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The identified resource is absent or inaccessible
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// A destructive operation was called without a matching confirmation
    #[error("Confirmation required for operation: {}", .0.operation)]
    ConfirmationRequired(Box<ConfirmationChallenge>),

    /// A write operation was attempted while the server is read-only
    #[error("Operation '{operation}' requires write access. The server is currently in read-only mode.")]
    ReadOnly {
        /// The operation that was attempted
        operation: String,
    },

    /// Error reported by the control-plane API
    #[error("Control-plane error {code}: {message}")]
    Api {
        /// Machine-readable error code from the backend
        code: String,
        /// Backend-supplied error message
        message: String,
    },

    /// Transport error talking to a backend service
    #[error("Transport error: {0}")]
    Transport(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a backend API error
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }
}
