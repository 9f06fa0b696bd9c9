//! Use-case services.
//!
//! Services are generic over the repository contracts and are constructed
//! per request, like the repositories they wrap: shared collaborators live
//! behind `Arc`, and there is no cross-request mutable state.

mod analysis;
mod credit;
mod document;
mod idea;

pub use analysis::{AnalysisOutcome, AnalysisService};
pub use credit::CreditService;
pub use document::DocumentService;
pub use idea::IdeaService;

use ideaforge_common::config::CreditSettings;
use ideaforge_domain::events::DomainEvent;
use ideaforge_domain::identifiers::UserId;
use uuid::Uuid;

/// Request-scoped context threaded through every service call.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    /// Correlates every log line and event of one request
    pub request_id: Uuid,
    /// The authenticated user the request acts for
    pub user_id: UserId,
}

impl ServiceContext {
    /// Open a context for a user's request.
    pub fn new(user_id: UserId) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            user_id,
        }
    }
}

/// Port for publishing domain events.
///
/// The core does not bind a broker; implementations forward events
/// wherever the deployment wants them (a queue, a log, a test recorder).
pub trait EventPublisher: Send + Sync {
    /// Publish one event. Fire-and-forget: failures are the
    /// implementation's concern, never the use case's.
    fn publish(&self, event: DomainEvent);
}

/// Publisher that drops every event; the default for deployments without
/// an event pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventPublisher;

impl EventPublisher for NoOpEventPublisher {
    fn publish(&self, _event: DomainEvent) {}
}

/// Static service configuration.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Credit prices for paid actions
    pub credits: CreditSettings,
}
