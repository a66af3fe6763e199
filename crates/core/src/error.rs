//! Core error types

use thiserror::Error;

/// Core error type for Motorpool
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration could not be parsed or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
