//! Account repository for database operations.
//!
//! Implements the core `AccountRepository` trait using SeaORM.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::accounts;
use atrium_core::account::{
    Account, AccountError, AccountPatch, AccountRepository as AccountRepoTrait, NewAccount,
};
use atrium_shared::Role;

/// Account repository implementation.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl AccountRepoTrait for AccountRepository {
    async fn create(&self, input: NewAccount) -> Result<Account, AccountError> {
        let now = Utc::now();
        let active_model = accounts::ActiveModel {
            id: Set(input.id),
            email: Set(input.email),
            full_name: Set(input.full_name),
            role: Set(input.role.as_str().to_string()),
            password_hash: Set(input.password_hash),
            photo_key: Set(None),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = active_model.insert(&self.db).await.map_err(|e| {
            // The store prechecks the email, but a concurrent insert can
            // still trip the unique constraint.
            if e.to_string().contains("duplicate key") {
                AccountError::conflict("email already registered")
            } else {
                AccountError::repository(e.to_string())
            }
        })?;

        Ok(to_domain(model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AccountError> {
        let model = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AccountError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn list(&self) -> Result<Vec<Account>, AccountError> {
        let models = accounts::Entity::find()
            .order_by_desc(accounts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| AccountError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: AccountPatch,
    ) -> Result<Option<Account>, AccountError> {
        let Some(model) = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AccountError::repository(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut active_model: accounts::ActiveModel = model.into();
        if let Some(email) = patch.email {
            active_model.email = Set(email);
        }
        if let Some(full_name) = patch.full_name {
            active_model.full_name = Set(full_name);
        }
        if let Some(role) = patch.role {
            active_model.role = Set(role.as_str().to_string());
        }
        if let Some(is_active) = patch.is_active {
            active_model.is_active = Set(is_active);
        }
        if let Some(photo_key) = patch.photo_key {
            active_model.photo_key = Set(photo_key);
        }
        active_model.updated_at = Set(Utc::now().into());

        let updated = active_model
            .update(&self.db)
            .await
            .map_err(|e| AccountError::repository(e.to_string()))?;

        Ok(Some(to_domain(updated)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AccountError> {
        let result = accounts::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AccountError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AccountError> {
        let count: u64 = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .count(&self.db)
            .await
            .map_err(|e| AccountError::repository(e.to_string()))?;

        Ok(count > 0)
    }
}

/// Convert database model to domain model.
fn to_domain(model: accounts::Model) -> Account {
    Account {
        id: model.id,
        email: model.email,
        full_name: model.full_name,
        role: Role::parse(&model.role).unwrap_or_default(),
        password_hash: model.password_hash,
        photo_key: model.photo_key,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&chrono::Utc),
        updated_at: model.updated_at.with_timezone(&chrono::Utc),
    }
}
