//! Account types and data structures.

use atrium_shared::Role;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Full account record.
///
/// Carries the secret field and is therefore deliberately NOT serializable;
/// boundaries only ever see [`AccountView`].
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique identifier.
    pub id: Uuid,
    /// Email address (unique).
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Account role.
    pub role: Role,
    /// Argon2id hash of the password. The secret field.
    pub password_hash: String,
    /// Object-store key of the profile photo, if one is set.
    ///
    /// When present, the key names an object that currently exists in the
    /// store, modulo the transient failure windows of the replace protocol.
    pub photo_key: Option<String>,
    /// Whether the account is active.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Public projection of an account record.
///
/// Everything except the secret field. This is the only account shape that
/// reaches the API surface.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    /// Unique identifier.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Account role.
    pub role: Role,
    /// Object-store key of the profile photo, if one is set.
    pub photo_key: Option<String>,
    /// Whether the account is active.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            full_name: account.full_name,
            role: account.role,
            photo_key: account.photo_key,
            is_active: account.is_active,
            created_at: account.created_at,
        }
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Email address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Plaintext password, hashed before persistence.
    pub password: String,
    /// Account role.
    pub role: Role,
}

/// Validated record handed to the repository for insertion.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Unique identifier.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Account role.
    pub role: Role,
    /// Argon2id hash of the password.
    pub password_hash: String,
}

/// Partial update applied to an existing account.
///
/// `photo_key` is doubly optional: `None` leaves the reference alone,
/// `Some(None)` clears it, `Some(Some(key))` swaps it.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    /// New email address.
    pub email: Option<String>,
    /// New display name.
    pub full_name: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New active flag.
    pub is_active: Option<bool>,
    /// Photo reference swap.
    pub photo_key: Option<Option<String>>,
}

impl AccountPatch {
    /// Patch that only swaps the photo reference.
    #[must_use]
    pub fn set_photo_key(key: Option<String>) -> Self {
        Self {
            photo_key: Some(key),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.full_name.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
            && self.photo_key.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_account() -> Account {
        Account {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            full_name: "Ada Lovelace".to_string(),
            role: Role::User,
            password_hash: "$argon2id$...".to_string(),
            photo_key: Some("images/account_x_photo.jpg".to_string()),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_view_projection_drops_secret() {
        let account = sample_account();
        let view = AccountView::from(account.clone());

        assert_eq!(view.id, account.id);
        assert_eq!(view.email, account.email);
        assert_eq!(view.photo_key, account.photo_key);

        // The serialized view must never leak the hash.
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_patch_photo_key_only() {
        let patch = AccountPatch::set_photo_key(Some("images/account_y_p.png".to_string()));
        assert!(patch.email.is_none());
        assert!(patch.role.is_none());
        assert_eq!(
            patch.photo_key,
            Some(Some("images/account_y_p.png".to_string()))
        );
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(AccountPatch::default().is_empty());
        assert!(!AccountPatch::set_photo_key(None).is_empty());
    }
}
