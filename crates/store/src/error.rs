//! Error types for store operations.

use motorpool_domain::DomainError;
use thiserror::Error;

/// Errors that can occur while talking to the REST API.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// Network or connection failure before a response arrived
    #[error("Transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status
    #[error("Request failed with status code {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Server-provided description, or the status reason
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The request could not be built (e.g. update without an identifier)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Domain-level failure (serialization, validation)
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl StoreError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
