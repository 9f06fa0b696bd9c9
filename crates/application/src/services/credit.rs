//! Credit ledger use cases.
//!
//! The paid-action flow is deduct-then-perform-then-refund-on-failure:
//! the deduction is durably recorded before the paid action begins, and
//! the refund is idempotent and retryable, keyed by the action id. A
//! second refund attempt for the same action changes nothing, so at-least-
//! once retry semantics cannot double-refund.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use ideaforge_common::pagination::{Page, PageRequest};
use ideaforge_domain::credit::{self, CreditTransaction, ReconciliationReport};
use ideaforge_domain::events::DomainEvent;
use ideaforge_domain::identifiers::UserId;
use ideaforge_infrastructure::repositories::{LedgerCommands, LedgerQueries};

use super::{EventPublisher, ServiceConfig, ServiceContext};
use crate::{ApplicationError, ApplicationResult};

/// Use cases for the credit ledger.
pub struct CreditService<L, E>
where
    L: LedgerCommands + LedgerQueries,
    E: EventPublisher,
{
    ledger: Arc<L>,
    events: Arc<E>,
    config: ServiceConfig,
}

impl<L, E> CreditService<L, E>
where
    L: LedgerCommands + LedgerQueries,
    E: EventPublisher,
{
    /// Wire a service to its collaborators.
    pub fn new(ledger: Arc<L>, events: Arc<E>, config: ServiceConfig) -> Self {
        Self {
            ledger,
            events,
            config,
        }
    }

    /// Deduct the configured price of one analysis.
    pub async fn deduct_for_analysis(
        &self,
        ctx: &ServiceContext,
        action_id: &str,
    ) -> ApplicationResult<CreditTransaction> {
        self.deduct_for_action(ctx, self.config.credits.analysis_cost, "idea analysis", action_id)
            .await
    }

    /// Deduct the configured price of one document generation.
    pub async fn deduct_for_document(
        &self,
        ctx: &ServiceContext,
        action_id: &str,
    ) -> ApplicationResult<CreditTransaction> {
        self.deduct_for_action(
            ctx,
            self.config.credits.document_cost,
            "document generation",
            action_id,
        )
        .await
    }

    /// Grant purchased or promotional credits.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn grant(
        &self,
        ctx: &ServiceContext,
        user_id: UserId,
        credits: u32,
        description: &str,
    ) -> ApplicationResult<CreditTransaction> {
        let tx = CreditTransaction::add(user_id, credits, description)?;
        self.ledger.record(&tx).await?;
        info!(user_id = %user_id, credits, "Credits granted");
        Ok(tx)
    }

    /// Deduct the cost of a paid action before performing it.
    ///
    /// Fails with `InsufficientCredits` when the balance cannot cover the
    /// cost. On success the deduction is durably recorded; the caller then
    /// performs the action and calls
    /// [`CreditService::refund_failed_action`] if it fails.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn deduct_for_action(
        &self,
        ctx: &ServiceContext,
        cost: u32,
        description: &str,
        action_id: &str,
    ) -> ApplicationResult<CreditTransaction> {
        let available = self.ledger.balance(ctx.user_id).await?;
        if available < i64::from(cost) {
            return Err(ApplicationError::InsufficientCredits {
                required: i64::from(cost),
                available,
            });
        }

        let tx = CreditTransaction::deduct(ctx.user_id, cost, description, action_id)?;
        self.ledger.record(&tx).await?;

        self.events.publish(DomainEvent::CreditsDeducted {
            transaction_id: tx.id,
            user_id: ctx.user_id,
            amount: tx.amount,
            action_id: action_id.to_string(),
        });
        info!(action_id, cost, "Credits deducted for action");
        Ok(tx)
    }

    /// Refund a failed paid action, idempotently.
    ///
    /// Returns the refund transaction, or `None` when the action was
    /// already refunded (a retry observing at-least-once delivery). The
    /// refunded amount always equals the original deduction.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn refund_failed_action(
        &self,
        ctx: &ServiceContext,
        action_id: &str,
    ) -> ApplicationResult<Option<CreditTransaction>> {
        if self
            .ledger
            .has_refund_for_action(ctx.user_id, action_id)
            .await?
        {
            warn!(action_id, "Refund already recorded; skipping");
            return Ok(None);
        }

        let entries = self.ledger.find_by_action(ctx.user_id, action_id).await?;
        let deduction = entries
            .iter()
            .find(|tx| tx.amount < 0)
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("deduction for action {action_id}"))
            })?;

        let credits = u32::try_from(-deduction.amount).map_err(|_| {
            ApplicationError::DataIntegrity(format!(
                "deduction {} has an unrepresentable amount",
                deduction.id
            ))
        })?;
        let refund = CreditTransaction::refund(
            ctx.user_id,
            credits,
            format!("refund: {}", deduction.description),
            action_id,
        )?;
        self.ledger.record(&refund).await?;

        self.events.publish(DomainEvent::CreditsRefunded {
            transaction_id: refund.id,
            user_id: ctx.user_id,
            amount: refund.amount,
            action_id: action_id.to_string(),
        });
        info!(action_id, credits, "Failed action refunded");
        Ok(Some(refund))
    }

    /// The acting user's derived balance.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn balance(&self, ctx: &ServiceContext) -> ApplicationResult<i64> {
        Ok(self.ledger.balance(ctx.user_id).await?)
    }

    /// Page through the acting user's transaction history.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn history(
        &self,
        ctx: &ServiceContext,
        page: PageRequest,
    ) -> ApplicationResult<Page<CreditTransaction>> {
        Ok(self.ledger.history(ctx.user_id, page).await?)
    }

    /// Pair deductions with refunds across the user's full history and
    /// report anomalies (refunds with no matching deduction).
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn reconcile(&self, ctx: &ServiceContext) -> ApplicationResult<ReconciliationReport> {
        let mut transactions = Vec::new();
        let mut page = 1u32;
        loop {
            let chunk = self
                .ledger
                .history(ctx.user_id, PageRequest::new(page, 100))
                .await?;
            let has_next = chunk.has_next;
            transactions.extend(chunk.items);
            if !has_next {
                break;
            }
            page += 1;
        }

        let report = credit::reconcile(&transactions);
        if report.has_anomalies() {
            warn!(
                orphaned_refunds = report.orphaned_refunds.len(),
                "Ledger reconciliation found anomalies"
            );
        }
        Ok(report)
    }
}
