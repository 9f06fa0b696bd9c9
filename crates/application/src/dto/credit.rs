//! Credit ledger DTOs.

use chrono::{DateTime, Utc};
use ideaforge_domain::credit::CreditTransaction;
use serde::Serialize;

/// Flattened view of one ledger entry.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionDto {
    /// Transaction id
    pub id: String,
    /// Signed amount in whole credits
    pub amount: i64,
    /// Entry kind code
    pub tx_type: String,
    /// Human-readable reason
    pub description: String,
    /// The logical action this entry belongs to, when stamped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,
    /// When the balance change logically happened
    pub timestamp: DateTime<Utc>,
}

impl From<CreditTransaction> for TransactionDto {
    fn from(tx: CreditTransaction) -> Self {
        let action_id = tx.action_id().map(str::to_string);
        Self {
            id: tx.id.to_string(),
            amount: tx.amount,
            tx_type: tx.tx_type.as_str().to_string(),
            description: tx.description,
            action_id,
            timestamp: tx.timestamp,
        }
    }
}

/// A user's current derived balance.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceDto {
    /// The user
    pub user_id: String,
    /// Sum of their entire transaction history
    pub balance: i64,
}
