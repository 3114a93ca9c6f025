//! Account store service.

use std::sync::Arc;

use uuid::Uuid;

use super::error::AccountError;
use super::types::{Account, AccountPatch, AccountView, CreateAccountInput, NewAccount};
use crate::auth::hash_password;

/// Repository trait for account persistence.
///
/// Implemented by the db crate; mocked in tests.
pub trait AccountRepository: Send + Sync {
    /// Insert a validated account record.
    fn create(
        &self,
        input: NewAccount,
    ) -> impl std::future::Future<Output = Result<Account, AccountError>> + Send;

    /// Find an account by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Account>, AccountError>> + Send;

    /// List all accounts. Ordering is the repository's business.
    fn list(&self)
    -> impl std::future::Future<Output = Result<Vec<Account>, AccountError>> + Send;

    /// Apply a partial update, returning the updated record or `None` if absent.
    fn update(
        &self,
        id: Uuid,
        patch: AccountPatch,
    ) -> impl std::future::Future<Output = Result<Option<Account>, AccountError>> + Send;

    /// Delete an account, returning whether a record was removed.
    fn delete(&self, id: Uuid)
    -> impl std::future::Future<Output = Result<bool, AccountError>> + Send;

    /// Check if an email is already registered.
    fn email_exists(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<bool, AccountError>> + Send;
}

/// Account store: validated CRUD over the repository, returning public views.
///
/// Performs no object-store I/O; photo cleanup is the profile service's job
/// and must happen before `delete`.
pub struct AccountStore<R: AccountRepository> {
    repo: Arc<R>,
}

impl<R: AccountRepository> AccountStore<R> {
    /// Create a new account store.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// List all accounts as public views.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn list(&self) -> Result<Vec<AccountView>, AccountError> {
        let accounts = self.repo.list().await?;
        Ok(accounts.into_iter().map(AccountView::from).collect())
    }

    /// Fetch a single account as a public view.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the id does not exist.
    pub async fn get(&self, id: Uuid) -> Result<AccountView, AccountError> {
        self.repo
            .find_by_id(id)
            .await?
            .map(AccountView::from)
            .ok_or(AccountError::NotFound(id))
    }

    /// Create an account. The password is hashed before persistence and the
    /// returned view never contains it.
    ///
    /// # Errors
    ///
    /// Returns `Validation` on bad fields, `Conflict` on a duplicate email.
    pub async fn create(&self, input: CreateAccountInput) -> Result<AccountView, AccountError> {
        validate_email(&input.email)?;
        validate_full_name(&input.full_name)?;
        validate_password(&input.password)?;

        if self.repo.email_exists(&input.email).await? {
            return Err(AccountError::conflict(format!(
                "email already registered: {}",
                input.email
            )));
        }

        let password_hash =
            hash_password(&input.password).map_err(|e| AccountError::Internal(e.to_string()))?;

        let record = NewAccount {
            id: Uuid::new_v4(),
            email: input.email,
            full_name: input.full_name,
            role: input.role,
            password_hash,
        };

        let account = self.repo.create(record).await?;
        Ok(AccountView::from(account))
    }

    /// Apply a validated partial update.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id does not exist, `Validation` on invalid
    /// field values or an empty patch.
    pub async fn patch(&self, id: Uuid, patch: AccountPatch) -> Result<AccountView, AccountError> {
        if patch.is_empty() {
            return Err(AccountError::validation("no fields to update"));
        }
        if let Some(email) = &patch.email {
            validate_email(email)?;
        }
        if let Some(full_name) = &patch.full_name {
            validate_full_name(full_name)?;
        }

        self.repo
            .update(id, patch)
            .await?
            .map(AccountView::from)
            .ok_or(AccountError::NotFound(id))
    }

    /// Delete an account record. No object-store I/O happens here.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the id does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), AccountError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(AccountError::NotFound(id))
        }
    }
}

fn validate_email(email: &str) -> Result<(), AccountError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') || trimmed.len() > 255 {
        return Err(AccountError::validation(format!(
            "invalid email address: {email}"
        )));
    }
    Ok(())
}

fn validate_full_name(full_name: &str) -> Result<(), AccountError> {
    if full_name.trim().is_empty() {
        return Err(AccountError::validation("full name must not be empty"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.len() < 8 {
        return Err(AccountError::validation(
            "password must be at least 8 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_shared::Role;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock repository for testing.
    #[derive(Default)]
    struct MockAccountRepository {
        accounts: Mutex<HashMap<Uuid, Account>>,
    }

    impl AccountRepository for MockAccountRepository {
        async fn create(&self, input: NewAccount) -> Result<Account, AccountError> {
            let now = chrono::Utc::now();
            let account = Account {
                id: input.id,
                email: input.email,
                full_name: input.full_name,
                role: input.role,
                password_hash: input.password_hash,
                photo_key: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            self.accounts
                .lock()
                .unwrap()
                .insert(account.id, account.clone());
            Ok(account)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AccountError> {
            Ok(self.accounts.lock().unwrap().get(&id).cloned())
        }

        async fn list(&self) -> Result<Vec<Account>, AccountError> {
            Ok(self.accounts.lock().unwrap().values().cloned().collect())
        }

        async fn update(
            &self,
            id: Uuid,
            patch: AccountPatch,
        ) -> Result<Option<Account>, AccountError> {
            let mut accounts = self.accounts.lock().unwrap();
            let Some(account) = accounts.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(email) = patch.email {
                account.email = email;
            }
            if let Some(full_name) = patch.full_name {
                account.full_name = full_name;
            }
            if let Some(role) = patch.role {
                account.role = role;
            }
            if let Some(is_active) = patch.is_active {
                account.is_active = is_active;
            }
            if let Some(photo_key) = patch.photo_key {
                account.photo_key = photo_key;
            }
            account.updated_at = chrono::Utc::now();
            Ok(Some(account.clone()))
        }

        async fn delete(&self, id: Uuid) -> Result<bool, AccountError> {
            Ok(self.accounts.lock().unwrap().remove(&id).is_some())
        }

        async fn email_exists(&self, email: &str) -> Result<bool, AccountError> {
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .values()
                .any(|a| a.email == email))
        }
    }

    fn store() -> AccountStore<MockAccountRepository> {
        AccountStore::new(Arc::new(MockAccountRepository::default()))
    }

    fn create_input(email: &str) -> CreateAccountInput {
        CreateAccountInput {
            email: email.to_string(),
            full_name: "Test Account".to_string(),
            password: "hunter22hunter22".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_create_returns_view_without_secret() {
        let store = store();
        let view = store.create(create_input("a@example.com")).await.unwrap();

        assert_eq!(view.email, "a@example.com");
        assert!(view.photo_key.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_email() {
        let store = store();
        let err = store
            .create(create_input("not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_short_password() {
        let store = store();
        let mut input = create_input("a@example.com");
        input.password = "short".to_string();
        let err = store.create(input).await.unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_duplicate_email_conflicts() {
        let store = store();
        store.create(create_input("a@example.com")).await.unwrap();
        let err = store
            .create(create_input("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let store = store();
        let err = store.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AccountError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_patch_updates_fields() {
        let store = store();
        let created = store.create(create_input("a@example.com")).await.unwrap();

        let patch = AccountPatch {
            full_name: Some("Renamed".to_string()),
            role: Some(Role::Admin),
            ..AccountPatch::default()
        };
        let updated = store.patch(created.id, patch).await.unwrap();

        assert_eq!(updated.full_name, "Renamed");
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.email, "a@example.com");
    }

    #[tokio::test]
    async fn test_patch_rejects_empty_patch() {
        let store = store();
        let created = store.create(create_input("a@example.com")).await.unwrap();
        let err = store
            .patch(created.id, AccountPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));
    }

    #[tokio::test]
    async fn test_patch_not_found() {
        let store = store();
        let patch = AccountPatch {
            full_name: Some("Ghost".to_string()),
            ..AccountPatch::default()
        };
        let err = store.patch(Uuid::new_v4(), patch).await.unwrap_err();
        assert!(matches!(err, AccountError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_account() {
        let store = store();
        let created = store.create(create_input("a@example.com")).await.unwrap();

        store.delete(created.id).await.unwrap();
        assert!(matches!(
            store.get(created.id).await,
            Err(AccountError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let store = store();
        let err = store.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AccountError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_returns_all_views() {
        let store = store();
        store.create(create_input("a@example.com")).await.unwrap();
        store.create(create_input("b@example.com")).await.unwrap();

        let views = store.list().await.unwrap();
        assert_eq!(views.len(), 2);
    }
}
