//! Credit ledger repository.
//!
//! The ledger is append-only by construction: `record` is the only legal
//! mutation, and the `update`/`delete` methods required by the contract
//! fail with `ImmutableRecord` without ever touching the store. Balances
//! are derived purely from the summed history; there is no mutable
//! balance column to drift out of agreement.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

use ideaforge_common::pagination::{Page, PageRequest};
use ideaforge_domain::credit::{CreditTransaction, ACTION_ID_KEY};
use ideaforge_domain::errors::{RepoResult, RepositoryError};
use ideaforge_domain::identifiers::{TransactionId, UserId};

use crate::mapping::{record_to_transaction, records_to_transactions, transaction_to_record};
use crate::records::CreditTransactionRecord;

use super::{map_mapping_err, map_sqlx_err};

/// Write operations on the ledger.
#[async_trait]
pub trait LedgerCommands: Send + Sync {
    /// Append a transaction, the only legal way to change a balance.
    ///
    /// The entry's sign rule is re-validated at the boundary so a buggy
    /// caller cannot append a deduction with a positive amount.
    async fn record(&self, tx: &CreditTransaction) -> RepoResult<TransactionId>;

    /// Always fails with `ImmutableRecord`; ledger entries are permanent.
    async fn update(&self, tx: &CreditTransaction) -> RepoResult<()>;

    /// Always fails with `ImmutableRecord`; ledger entries are permanent.
    async fn delete(&self, id: TransactionId) -> RepoResult<()>;
}

/// Read operations on the ledger.
#[async_trait]
pub trait LedgerQueries: Send + Sync {
    /// A user's balance: the sum of every amount in their history.
    async fn balance(&self, user_id: UserId) -> RepoResult<i64>;

    /// Fetch one transaction. With a requesting owner supplied, foreign
    /// entries are reported as `NotFound`.
    async fn find_by_id(
        &self,
        id: TransactionId,
        requesting_owner: Option<UserId>,
    ) -> RepoResult<CreditTransaction>;

    /// Page through a user's history, newest first by logical timestamp.
    async fn history(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> RepoResult<Page<CreditTransaction>>;

    /// Every entry stamped with a logical action id, oldest first.
    async fn find_by_action(
        &self,
        user_id: UserId,
        action_id: &str,
    ) -> RepoResult<Vec<CreditTransaction>>;

    /// Whether a refund for the action has already been recorded.
    async fn has_refund_for_action(&self, user_id: UserId, action_id: &str) -> RepoResult<bool>;

    /// How many entries a user's history holds.
    async fn count(&self, user_id: UserId) -> RepoResult<u64>;
}

/// PostgreSQL implementation of the ledger contracts.
pub struct PgCreditRepository {
    pool: PgPool,
}

const TRANSACTION_COLUMNS: &str =
    r#"id, user_id, amount, tx_type, description, metadata, "timestamp", created_at"#;

impl PgCreditRepository {
    /// Create a repository bound to a pool handle.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerCommands for PgCreditRepository {
    #[instrument(skip(self, tx), fields(transaction_id = %tx.id, tx_type = tx.tx_type.as_str()))]
    async fn record(&self, tx: &CreditTransaction) -> RepoResult<TransactionId> {
        tx.tx_type.validate_amount(tx.amount)?;

        let record = transaction_to_record(tx);
        sqlx::query(
            r#"
            INSERT INTO credit_transactions (
                id, user_id, amount, tx_type, description, metadata, "timestamp", created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.amount)
        .bind(&record.tx_type)
        .bind(&record.description)
        .bind(&record.metadata)
        .bind(record.timestamp)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        debug!(transaction_id = %tx.id, amount = tx.amount, "Ledger entry recorded");
        Ok(tx.id)
    }

    async fn update(&self, tx: &CreditTransaction) -> RepoResult<()> {
        error!(
            transaction_id = %tx.id,
            "Attempted update of an append-only ledger entry"
        );
        Err(RepositoryError::ImmutableRecord)
    }

    async fn delete(&self, id: TransactionId) -> RepoResult<()> {
        error!(
            transaction_id = %id,
            "Attempted delete of an append-only ledger entry"
        );
        Err(RepositoryError::ImmutableRecord)
    }
}

#[async_trait]
impl LedgerQueries for PgCreditRepository {
    #[instrument(skip(self))]
    async fn balance(&self, user_id: UserId) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount), 0) FROM credit_transactions WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    #[instrument(skip(self))]
    async fn find_by_id(
        &self,
        id: TransactionId,
        requesting_owner: Option<UserId>,
    ) -> RepoResult<CreditTransaction> {
        let record = sqlx::query_as::<_, CreditTransactionRecord>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM credit_transactions WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or(RepositoryError::NotFound)?;

        if let Some(owner) = requesting_owner {
            if record.user_id != *owner.as_uuid() {
                return Err(RepositoryError::NotFound);
            }
        }

        record_to_transaction(record).map_err(map_mapping_err)
    }

    #[instrument(skip(self))]
    async fn history(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> RepoResult<Page<CreditTransaction>> {
        let page = PageRequest::new(page.page, page.limit);

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM credit_transactions WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let records = sqlx::query_as::<_, CreditTransactionRecord>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS} FROM credit_transactions
            WHERE user_id = $1
            ORDER BY "timestamp" DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id.as_uuid())
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let transactions = records_to_transactions(records).map_err(map_mapping_err)?;
        Ok(Page::from_request(transactions, &page, total as u64))
    }

    #[instrument(skip(self))]
    async fn find_by_action(
        &self,
        user_id: UserId,
        action_id: &str,
    ) -> RepoResult<Vec<CreditTransaction>> {
        let records = sqlx::query_as::<_, CreditTransactionRecord>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS} FROM credit_transactions
            WHERE user_id = $1 AND metadata ->> '{ACTION_ID_KEY}' = $2
            ORDER BY "timestamp" ASC
            "#
        ))
        .bind(user_id.as_uuid())
        .bind(action_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records_to_transactions(records).map_err(map_mapping_err)
    }

    #[instrument(skip(self))]
    async fn has_refund_for_action(&self, user_id: UserId, action_id: &str) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(&format!(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM credit_transactions
                WHERE user_id = $1
                  AND tx_type = 'refund'
                  AND metadata ->> '{ACTION_ID_KEY}' = $2
            )
            "#
        ))
        .bind(user_id.as_uuid())
        .bind(action_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    #[instrument(skip(self))]
    async fn count(&self, user_id: UserId) -> RepoResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM credit_transactions WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(count as u64)
    }
}
