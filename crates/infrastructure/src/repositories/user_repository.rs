//! User repository.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use ideaforge_domain::errors::{RepoResult, RepositoryError};
use ideaforge_domain::identifiers::UserId;
use ideaforge_domain::user::{User, UserPreferences, UserTier};

use crate::mapping::{record_to_user, user_to_record};
use crate::records::UserRecord;

use super::{map_mapping_err, map_sqlx_err};

/// Write operations on user accounts.
#[async_trait]
pub trait UserCommands: Send + Sync {
    /// Insert a new account.
    async fn save(&self, user: &User) -> RepoResult<UserId>;

    /// Move an account to a different tier.
    async fn update_tier(&self, id: UserId, tier: UserTier) -> RepoResult<()>;

    /// Replace an account's preferences.
    async fn update_preferences(&self, id: UserId, preferences: &UserPreferences)
        -> RepoResult<()>;
}

/// Read operations on user accounts.
#[async_trait]
pub trait UserQueries: Send + Sync {
    /// Fetch one account.
    async fn find_by_id(&self, id: UserId) -> RepoResult<User>;

    /// Whether an account exists.
    async fn exists(&self, id: UserId) -> RepoResult<bool>;

    /// Total number of accounts.
    async fn count(&self) -> RepoResult<u64>;
}

/// PostgreSQL implementation of the user contracts.
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a repository bound to a pool handle.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserCommands for PgUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn save(&self, user: &User) -> RepoResult<UserId> {
        let record = user_to_record(user);
        sqlx::query(
            r#"
            INSERT INTO users (id, tier, preferences, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id)
        .bind(&record.tier)
        .bind(&record.preferences)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        debug!(user_id = %user.id, "User saved");
        Ok(user.id)
    }

    #[instrument(skip(self))]
    async fn update_tier(&self, id: UserId, tier: UserTier) -> RepoResult<()> {
        let result = sqlx::query("UPDATE users SET tier = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(tier.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, preferences))]
    async fn update_preferences(
        &self,
        id: UserId,
        preferences: &UserPreferences,
    ) -> RepoResult<()> {
        let payload = serde_json::to_value(preferences)
            .expect("preference serialization is infallible");
        let result = sqlx::query("UPDATE users SET preferences = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(payload)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserQueries for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> RepoResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, tier, preferences, created_at FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or(RepositoryError::NotFound)?;

        record_to_user(record).map_err(map_mapping_err)
    }

    #[instrument(skip(self))]
    async fn exists(&self, id: UserId) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> RepoResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(count as u64)
    }
}
