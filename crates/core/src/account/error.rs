//! Account error types.

use thiserror::Error;
use uuid::Uuid;

/// Account store errors.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Account not found.
    #[error("account not found: {0}")]
    NotFound(Uuid),

    /// A field failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Email already registered.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AccountError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error.
    #[must_use]
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}
