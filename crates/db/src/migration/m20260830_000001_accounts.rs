//! Initial accounts migration.
//!
//! Creates the accounts table. The photo object itself lives in the external
//! object store; `photo_key` only carries the reference.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS accounts CASCADE;")
            .await?;
        Ok(())
    }
}

const ACCOUNTS_SQL: &str = r"
-- Accounts table
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name TEXT NOT NULL,
    role VARCHAR(16) NOT NULL DEFAULT 'user',
    password_hash TEXT NOT NULL,
    photo_key TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_accounts_role CHECK (role IN ('user', 'admin'))
);

-- Index for listing (newest first)
CREATE INDEX idx_accounts_created ON accounts(created_at DESC);
";
