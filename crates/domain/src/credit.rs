//! Credit ledger entries.
//!
//! A user's balance is never stored as mutable state: it is the running
//! sum of signed amounts over their append-only transaction history. Any
//! "undo" is a new compensating record (a refund), never an edit. A
//! deduction and its refund reference the same logical action through the
//! `action_id` metadata key so reconciliation can pair them.

use crate::errors::{DomainResult, InvalidValue};
use crate::identifiers::{TransactionId, UserId};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Metadata key pairing a deduction with its compensating refund.
pub const ACTION_ID_KEY: &str = "action_id";

/// The kinds of ledger entries, each with a fixed sign rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Credits spent on a generation action (negative amount)
    Deduct,
    /// Credits purchased or granted (positive amount)
    Add,
    /// Compensation for a failed paid action (positive amount)
    Refund,
    /// Manual correction by an administrator (either sign, never zero)
    AdminAdjustment,
}

impl TransactionType {
    /// Every transaction type.
    pub fn all() -> &'static [TransactionType] {
        &[Self::Deduct, Self::Add, Self::Refund, Self::AdminAdjustment]
    }

    /// The wire code for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deduct => "deduct",
            Self::Add => "add",
            Self::Refund => "refund",
            Self::AdminAdjustment => "admin_adjustment",
        }
    }

    /// Parse a wire code.
    pub fn parse(s: &str) -> Result<Self, InvalidValue> {
        match s {
            "deduct" => Ok(Self::Deduct),
            "add" => Ok(Self::Add),
            "refund" => Ok(Self::Refund),
            "admin_adjustment" => Ok(Self::AdminAdjustment),
            other => Err(InvalidValue::UnknownTransactionType(other.to_string())),
        }
    }

    /// Check an amount against this type's sign rule.
    pub fn validate_amount(&self, amount: i64) -> Result<(), InvalidValue> {
        let ok = match self {
            Self::Deduct => amount < 0,
            Self::Add | Self::Refund => amount > 0,
            Self::AdminAdjustment => amount != 0,
        };
        if ok {
            Ok(())
        } else {
            Err(InvalidValue::InvalidAmount {
                tx_type: *self,
                amount,
            })
        }
    }
}

/// One immutable entry in a user's credit ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditTransaction {
    /// Unique identifier
    pub id: TransactionId,
    /// The user whose balance this entry affects
    pub user_id: UserId,
    /// Signed amount in whole credits
    pub amount: i64,
    /// Entry kind; fixes the sign of `amount`
    pub tx_type: TransactionType,
    /// Human-readable reason
    pub description: String,
    /// Opaque key/value context (action ids, plan names, ...)
    pub metadata: IndexMap<String, String>,
    /// When the balance change logically happened
    pub timestamp: DateTime<Utc>,
    /// When the row was written
    pub created_at: DateTime<Utc>,
}

impl CreditTransaction {
    /// Create a ledger entry, enforcing the type's sign rule.
    pub fn new(
        user_id: UserId,
        amount: i64,
        tx_type: TransactionType,
        description: impl Into<String>,
        metadata: IndexMap<String, String>,
    ) -> DomainResult<Self> {
        tx_type.validate_amount(amount)?;
        let now = Utc::now();
        Ok(Self {
            id: TransactionId::new(),
            user_id,
            amount,
            tx_type,
            description: description.into(),
            metadata,
            timestamp: now,
            created_at: now,
        })
    }

    /// Deduct credits for a generation action.
    ///
    /// The action id is stamped into metadata so a later refund can be
    /// paired with this deduction.
    pub fn deduct(
        user_id: UserId,
        credits: u32,
        description: impl Into<String>,
        action_id: impl Into<String>,
    ) -> DomainResult<Self> {
        let mut metadata = IndexMap::new();
        metadata.insert(ACTION_ID_KEY.to_string(), action_id.into());
        Self::new(
            user_id,
            -i64::from(credits),
            TransactionType::Deduct,
            description,
            metadata,
        )
    }

    /// Grant purchased or promotional credits.
    pub fn add(user_id: UserId, credits: u32, description: impl Into<String>) -> DomainResult<Self> {
        Self::new(
            user_id,
            i64::from(credits),
            TransactionType::Add,
            description,
            IndexMap::new(),
        )
    }

    /// Refund a failed action, keyed by the original action id.
    pub fn refund(
        user_id: UserId,
        credits: u32,
        description: impl Into<String>,
        action_id: impl Into<String>,
    ) -> DomainResult<Self> {
        let mut metadata = IndexMap::new();
        metadata.insert(ACTION_ID_KEY.to_string(), action_id.into());
        Self::new(
            user_id,
            i64::from(credits),
            TransactionType::Refund,
            description,
            metadata,
        )
    }

    /// Manual correction by an administrator.
    pub fn admin_adjustment(
        user_id: UserId,
        amount: i64,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::new(
            user_id,
            amount,
            TransactionType::AdminAdjustment,
            description,
            IndexMap::new(),
        )
    }

    /// The logical action this entry belongs to, when stamped.
    pub fn action_id(&self) -> Option<&str> {
        self.metadata.get(ACTION_ID_KEY).map(String::as_str)
    }
}

/// A user's balance as a pure function of their transaction history.
///
/// Summation is order-independent, so the result is identical however the
/// underlying history was queried or paginated.
pub fn balance(transactions: &[CreditTransaction]) -> i64 {
    transactions.iter().map(|tx| tx.amount).sum()
}

/// Result of pairing deductions with refunds by action id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationReport {
    /// Action ids whose deduction has a matching refund
    pub refunded_actions: Vec<String>,
    /// Action ids deducted but never refunded (the action may simply have
    /// succeeded; callers cross-check against action outcomes)
    pub unrefunded_actions: Vec<String>,
    /// Refunds with no matching deduction; always an anomaly
    pub orphaned_refunds: Vec<TransactionId>,
}

impl ReconciliationReport {
    /// Whether any hard anomaly was detected.
    pub fn has_anomalies(&self) -> bool {
        !self.orphaned_refunds.is_empty()
    }
}

/// Pair deduct/refund entries of one user's history by action id.
pub fn reconcile(transactions: &[CreditTransaction]) -> ReconciliationReport {
    let mut report = ReconciliationReport::default();
    let deducted: std::collections::HashSet<&str> = transactions
        .iter()
        .filter(|tx| tx.tx_type == TransactionType::Deduct)
        .filter_map(CreditTransaction::action_id)
        .collect();
    let refunded: std::collections::HashSet<&str> = transactions
        .iter()
        .filter(|tx| tx.tx_type == TransactionType::Refund)
        .filter_map(CreditTransaction::action_id)
        .collect();

    for tx in transactions {
        match tx.tx_type {
            TransactionType::Deduct => {
                if let Some(action) = tx.action_id() {
                    if refunded.contains(action) {
                        report.refunded_actions.push(action.to_string());
                    } else {
                        report.unrefunded_actions.push(action.to_string());
                    }
                }
            }
            TransactionType::Refund => {
                let matched = tx.action_id().is_some_and(|a| deducted.contains(a));
                if !matched {
                    report.orphaned_refunds.push(tx.id);
                }
            }
            TransactionType::Add | TransactionType::AdminAdjustment => {}
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_rules() {
        assert!(TransactionType::Deduct.validate_amount(-5).is_ok());
        assert!(TransactionType::Deduct.validate_amount(5).is_err());
        assert!(TransactionType::Add.validate_amount(10).is_ok());
        assert!(TransactionType::Add.validate_amount(-10).is_err());
        assert!(TransactionType::Refund.validate_amount(0).is_err());
        assert!(TransactionType::AdminAdjustment.validate_amount(-3).is_ok());
        assert!(TransactionType::AdminAdjustment.validate_amount(3).is_ok());
        assert!(TransactionType::AdminAdjustment.validate_amount(0).is_err());
    }

    #[test]
    fn test_deduct_stamps_action_id() {
        let tx = CreditTransaction::deduct(UserId::new(), 5, "idea analysis", "act-123").unwrap();
        assert_eq!(tx.amount, -5);
        assert_eq!(tx.action_id(), Some("act-123"));
    }

    #[test]
    fn test_balance_is_the_running_sum() {
        let user = UserId::new();
        let txs = vec![
            CreditTransaction::add(user, 50, "starter pack").unwrap(),
            CreditTransaction::deduct(user, 20, "analysis", "a1").unwrap(),
            CreditTransaction::deduct(user, 10, "prd", "a2").unwrap(),
            CreditTransaction::refund(user, 5, "partial refund", "a2").unwrap(),
        ];
        assert_eq!(balance(&txs), 25);

        // order-independent
        let mut reversed = txs.clone();
        reversed.reverse();
        assert_eq!(balance(&reversed), 25);
    }

    #[test]
    fn test_reconcile_pairs_by_action_id() {
        let user = UserId::new();
        let txs = vec![
            CreditTransaction::deduct(user, 5, "analysis", "a1").unwrap(),
            CreditTransaction::refund(user, 5, "analysis failed", "a1").unwrap(),
            CreditTransaction::deduct(user, 3, "roadmap", "a2").unwrap(),
            CreditTransaction::refund(user, 3, "mystery refund", "a9").unwrap(),
        ];
        let report = reconcile(&txs);
        assert_eq!(report.refunded_actions, vec!["a1".to_string()]);
        assert_eq!(report.unrefunded_actions, vec!["a2".to_string()]);
        assert_eq!(report.orphaned_refunds.len(), 1);
        assert!(report.has_anomalies());
    }
}
