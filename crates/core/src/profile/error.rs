//! Profile error types.

use thiserror::Error;
use uuid::Uuid;

use crate::account::AccountError;
use crate::storage::StorageError;

/// Profile-photo operation errors.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Target account not found.
    #[error("account not found: {0}")]
    AccountNotFound(Uuid),

    /// Caller is neither the profile owner nor an administrator.
    #[error("caller {caller} is not authorized to update profile {account_id}")]
    NotOwner {
        /// The account whose profile was targeted.
        account_id: Uuid,
        /// The caller that was rejected.
        caller: Uuid,
    },

    /// No file bytes were supplied with the upload.
    #[error("no file was uploaded")]
    EmptyUpload,

    /// Object-store operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Account repository operation failed.
    #[error("account error: {0}")]
    Account(#[from] AccountError),
}
