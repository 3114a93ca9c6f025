//! Profile-photo service implementation.
//!
//! The replace protocol orders its steps so that a failure never corrupts
//! the account's photo reference: upload first, swap the reference second,
//! delete the previous object last and best-effort. A patch failure after a
//! successful upload leaves an orphaned object rather than a dangling
//! reference; orphans are recoverable out of band, dangling references are
//! user-visible breakage.

use std::sync::Arc;

use atrium_shared::Role;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::ProfileError;
use crate::account::{Account, AccountPatch, AccountRepository};
use crate::storage::{ObjectStore, photo_key};

/// Authenticated caller identity, supplied by the routing layer.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    /// Caller's account ID.
    pub id: Uuid,
    /// Caller's role.
    pub role: Role,
}

/// An uploaded photo, already parsed out of the transport by the API layer.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// Original filename of the upload.
    pub filename: String,
    /// MIME type of the file.
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// Profile-photo service: the replace/remove protocol with authorization.
pub struct ProfileService<R: AccountRepository> {
    storage: Arc<ObjectStore>,
    repo: Arc<R>,
}

impl<R: AccountRepository> ProfileService<R> {
    /// Create a new profile service.
    #[must_use]
    pub fn new(storage: Arc<ObjectStore>, repo: Arc<R>) -> Self {
        Self { storage, repo }
    }

    /// Succeeds iff the caller owns the target profile or is an admin.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotOwner` otherwise.
    pub fn authorize(account_id: Uuid, caller: Caller) -> Result<(), ProfileError> {
        if caller.id == account_id || caller.role == Role::Admin {
            Ok(())
        } else {
            Err(ProfileError::NotOwner {
                account_id,
                caller: caller.id,
            })
        }
    }

    /// Replace (or set) the target account's profile photo.
    ///
    /// Protocol: load and authorize, validate the payload, upload under the
    /// deterministic key, swap the record's reference, then best-effort
    /// delete the previous object. Returns the new storage key.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the target account does not exist
    /// - `NotOwner` if the caller may not touch this profile
    /// - `EmptyUpload` if no bytes were supplied (checked before any storage call)
    /// - `Storage` for MIME/size rejection or a failed upload; the record and
    ///   any existing photo are untouched in that case
    /// - `Account` if the reference swap fails after the upload; the new
    ///   object is then orphaned (logged), never rolled back
    pub async fn replace_photo(
        &self,
        account_id: Uuid,
        caller: Caller,
        upload: PhotoUpload,
    ) -> Result<String, ProfileError> {
        let account = self
            .repo
            .find_by_id(account_id)
            .await?
            .ok_or(ProfileError::AccountNotFound(account_id))?;

        Self::authorize(account_id, caller)?;

        if upload.bytes.is_empty() {
            return Err(ProfileError::EmptyUpload);
        }
        let size = u64::try_from(upload.bytes.len()).unwrap_or(u64::MAX);
        self.storage.validate_upload(&upload.content_type, size)?;

        let key = photo_key(account_id, &upload.filename);

        // Upload before reference-swap: a failed upload aborts here and
        // never orphans or breaks the existing reference.
        self.storage
            .put(&key, upload.bytes, &upload.content_type)
            .await?;

        let previous_key = account.photo_key;

        let patched = match self
            .repo
            .update(account_id, AccountPatch::set_photo_key(Some(key.clone())))
            .await
        {
            Ok(patched) => patched,
            Err(e) => {
                // The uploaded object is now unreferenced. Accepted as a
                // recoverable inconsistency; a rollback delete could fail
                // too and has no safe resolution.
                warn!(
                    account_id = %account_id,
                    key = %key,
                    error = %e,
                    "reference swap failed after upload; object orphaned"
                );
                return Err(e.into());
            }
        };
        if patched.is_none() {
            warn!(
                account_id = %account_id,
                key = %key,
                "account vanished during photo replace; object orphaned"
            );
            return Err(ProfileError::AccountNotFound(account_id));
        }

        // The record has already advanced to the new key, so a failure
        // here is logged and deliberately ignored.
        if let Some(previous) = previous_key.filter(|previous| *previous != key) {
            if let Err(e) = self.storage.delete(&previous).await {
                if e.is_not_found() {
                    debug!(key = %previous, "previous photo already gone");
                } else {
                    warn!(
                        account_id = %account_id,
                        key = %previous,
                        error = %e,
                        "failed to delete previous photo"
                    );
                }
            }
        }

        info!(account_id = %account_id, key = %key, "profile photo replaced");
        Ok(key)
    }

    /// Remove the account's photo object from storage, if it has one.
    ///
    /// Idempotent: a key that is no longer in the store is a silent skip.
    ///
    /// # Errors
    ///
    /// Returns a hard storage failure for the caller to inspect; callers on
    /// the account-deletion path log it and proceed.
    pub async fn remove_photo(&self, account: &Account) -> Result<(), ProfileError> {
        let Some(key) = &account.photo_key else {
            return Ok(());
        };

        if !self.storage.exists(key).await {
            debug!(account_id = %account.id, key = %key, "photo object already absent");
            return Ok(());
        }

        self.storage.delete(key).await?;
        info!(account_id = %account.id, key = %key, "profile photo removed");
        Ok(())
    }

    /// Delete an account, clearing its photo object first.
    ///
    /// Photo cleanup failures never block record removal; they are logged
    /// and the deletion proceeds.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist, or a
    /// repository error from the record delete itself.
    pub async fn delete_account(&self, account_id: Uuid) -> Result<(), ProfileError> {
        let account = self
            .repo
            .find_by_id(account_id)
            .await?
            .ok_or(ProfileError::AccountNotFound(account_id))?;

        // Inspected and deliberately ignored: the record delete is the
        // authoritative operation.
        if let Err(e) = self.remove_photo(&account).await {
            warn!(
                account_id = %account_id,
                error = %e,
                "photo cleanup failed; proceeding with account deletion"
            );
        }

        if self.repo.delete(account_id).await? {
            info!(account_id = %account_id, "account deleted");
            Ok(())
        } else {
            Err(ProfileError::AccountNotFound(account_id))
        }
    }
}
