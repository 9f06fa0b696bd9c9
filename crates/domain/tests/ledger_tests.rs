//! Tests for the credit ledger's pure balance arithmetic.

use ideaforge_domain::credit::{balance, reconcile, CreditTransaction, TransactionType};
use ideaforge_domain::identifiers::UserId;
use proptest::prelude::*;

#[test]
fn documented_example_balances_to_25() {
    let user = UserId::new();
    let txs = vec![
        CreditTransaction::add(user, 50, "grant").unwrap(),
        CreditTransaction::deduct(user, 20, "analysis", "a1").unwrap(),
        CreditTransaction::deduct(user, 10, "prd", "a2").unwrap(),
        CreditTransaction::refund(user, 5, "partial", "a2").unwrap(),
    ];
    assert_eq!(balance(&txs), 25);
}

#[test]
fn failed_action_without_refund_is_visible_to_reconciliation() {
    let user = UserId::new();
    let txs = vec![
        CreditTransaction::deduct(user, 5, "analysis", "lost-action").unwrap(),
    ];
    let report = reconcile(&txs);
    assert_eq!(report.unrefunded_actions, vec!["lost-action".to_string()]);
    assert!(report.refunded_actions.is_empty());
}

#[test]
fn admin_adjustments_accept_both_signs() {
    let user = UserId::new();
    let up = CreditTransaction::admin_adjustment(user, 7, "support credit").unwrap();
    let down = CreditTransaction::admin_adjustment(user, -7, "chargeback").unwrap();
    assert_eq!(balance(&[up, down]), 0);
    assert!(CreditTransaction::admin_adjustment(user, 0, "noop").is_err());
}

fn arb_transaction(user: UserId) -> impl Strategy<Value = CreditTransaction> {
    prop_oneof![
        (1u32..1000).prop_map(move |c| CreditTransaction::add(user, c, "add").unwrap()),
        (1u32..1000).prop_map(move |c| {
            CreditTransaction::deduct(user, c, "deduct", format!("act-{c}")).unwrap()
        }),
        (1u32..1000).prop_map(move |c| {
            CreditTransaction::refund(user, c, "refund", format!("act-{c}")).unwrap()
        }),
    ]
}

proptest! {
    #[test]
    fn balance_is_order_independent(
        indices in proptest::collection::vec(0usize..100, 0..20)
    ) {
        let user = UserId::new();
        let txs: Vec<CreditTransaction> = indices
            .iter()
            .map(|i| {
                if i % 2 == 0 {
                    CreditTransaction::add(user, (*i as u32) + 1, "add").unwrap()
                } else {
                    CreditTransaction::deduct(user, (*i as u32) + 1, "spend", format!("a{i}"))
                        .unwrap()
                }
            })
            .collect();

        let total = balance(&txs);
        let mut shuffled = txs.clone();
        shuffled.reverse();
        prop_assert_eq!(balance(&shuffled), total);
    }

    #[test]
    fn every_entry_respects_its_sign_rule(tx in arb_transaction(UserId::new())) {
        prop_assert!(tx.tx_type.validate_amount(tx.amount).is_ok());
        match tx.tx_type {
            TransactionType::Deduct => prop_assert!(tx.amount < 0),
            TransactionType::Add | TransactionType::Refund => prop_assert!(tx.amount > 0),
            TransactionType::AdminAdjustment => prop_assert!(tx.amount != 0),
        }
    }
}
