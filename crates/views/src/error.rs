//! Error types for view bindings.

use motorpool_domain::{DomainError, ValidationErrors};
use motorpool_store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ViewError {
    #[error("Invalid route: {0}")]
    Route(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ViewError {
    /// Per-field errors when submission was blocked by validation.
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            ViewError::Domain(DomainError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ViewError {
    fn from(errors: ValidationErrors) -> Self {
        ViewError::Domain(DomainError::Validation(errors))
    }
}

pub type ViewResult<T> = Result<T, ViewError>;
