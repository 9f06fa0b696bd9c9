//! PostgreSQL test-database harness.
//!
//! Integration tests that need a real database connect through
//! [`TestDatabase`], apply [`SCHEMA`], and truncate between cases. The
//! harness expects a reachable PostgreSQL instance (locally or via a
//! testcontainers-managed one); tests using it are `#[ignore]`d in plain
//! CI runs.

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;

/// The full relational schema the repositories assume.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          UUID PRIMARY KEY,
    tier        TEXT NOT NULL,
    preferences JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at  TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS ideas (
    id         UUID PRIMARY KEY,
    user_id    UUID NOT NULL,
    text       TEXT NOT NULL,
    source     TEXT NOT NULL,
    status     TEXT NOT NULL,
    notes      TEXT,
    tags       TEXT[] NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS ideas_user_id_idx ON ideas (user_id);

CREATE TABLE IF NOT EXISTS documents (
    id            UUID PRIMARY KEY,
    idea_id       UUID NOT NULL REFERENCES ideas (id),
    user_id       UUID NOT NULL,
    document_type TEXT NOT NULL,
    title         TEXT NOT NULL,
    content       JSONB NOT NULL,
    version       INTEGER NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL,
    updated_at    TIMESTAMPTZ NOT NULL,
    UNIQUE (idea_id, document_type, version)
);
CREATE INDEX IF NOT EXISTS documents_idea_id_idx ON documents (idea_id);
CREATE INDEX IF NOT EXISTS documents_user_id_idx ON documents (user_id);

CREATE TABLE IF NOT EXISTS analyses (
    id           UUID PRIMARY KEY,
    user_id      UUID NOT NULL,
    kind         TEXT NOT NULL,
    subject_text TEXT NOT NULL,
    score        DOUBLE PRECISION NOT NULL,
    locale       TEXT NOT NULL,
    payload      JSONB NOT NULL,
    created_at   TIMESTAMPTZ NOT NULL,
    updated_at   TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS analyses_user_id_idx ON analyses (user_id);
CREATE INDEX IF NOT EXISTS analyses_kind_idx ON analyses (kind);

CREATE TABLE IF NOT EXISTS credit_transactions (
    id          UUID PRIMARY KEY,
    user_id     UUID NOT NULL,
    amount      BIGINT NOT NULL,
    tx_type     TEXT NOT NULL,
    description TEXT NOT NULL,
    metadata    JSONB NOT NULL DEFAULT '{}'::jsonb,
    "timestamp" TIMESTAMPTZ NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS credit_transactions_user_id_idx
    ON credit_transactions (user_id, "timestamp");
"#;

/// Test database wrapper with schema setup and cleanup.
pub struct TestDatabase {
    pool: Arc<PgPool>,
}

impl TestDatabase {
    /// Connect to an existing PostgreSQL instance and apply the schema.
    pub async fn new_with_url(connection_string: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;

        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement).execute(&pool).await?;
        }

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Borrow the pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// An Arc clone of the pool for sharing.
    pub fn pool_arc(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    /// Truncate every table for test isolation.
    pub async fn clean(&self) -> anyhow::Result<()> {
        sqlx::query("TRUNCATE TABLE documents CASCADE")
            .execute(self.pool())
            .await?;
        sqlx::query("TRUNCATE TABLE ideas CASCADE")
            .execute(self.pool())
            .await?;
        sqlx::query("TRUNCATE TABLE analyses CASCADE")
            .execute(self.pool())
            .await?;
        sqlx::query("TRUNCATE TABLE credit_transactions CASCADE")
            .execute(self.pool())
            .await?;
        sqlx::query("TRUNCATE TABLE users CASCADE")
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
