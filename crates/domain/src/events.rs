//! Domain event types.
//!
//! Events describe facts the persistence layer has committed; the
//! application layer publishes them through its event-publisher port.
//! Nothing here binds a broker; events are plain serializable values.

use crate::document::DocumentType;
use crate::identifiers::{AnalysisId, DocumentId, IdeaId, TransactionId, UserId};
use crate::version::DocumentVersion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping any domain event for transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event id
    pub id: Uuid,
    /// Snake-case event name
    pub event_type: String,
    /// Serialized event payload
    pub payload: serde_json::Value,
    /// When the event occurred
    pub occurred_at: DateTime<Utc>,
}

impl EventEnvelope {
    /// Wrap an event for transport. Returns `None` only if the payload
    /// fails to serialize, which would indicate a bug in the event types.
    pub fn wrap(event: &DomainEvent) -> Option<Self> {
        Some(Self {
            id: Uuid::now_v7(),
            event_type: event.event_type().to_string(),
            payload: serde_json::to_value(event).ok()?,
            occurred_at: Utc::now(),
        })
    }
}

/// Everything the persistence core reports having done.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// An idea was created
    IdeaCreated {
        /// The new idea
        idea_id: IdeaId,
        /// Its owner
        user_id: UserId,
    },
    /// An idea and its documents were deleted
    IdeaDeleted {
        /// The removed idea
        idea_id: IdeaId,
        /// Its owner
        user_id: UserId,
        /// How many document rows the cascade removed
        documents_removed: u64,
    },
    /// A new document version was written
    DocumentVersionCreated {
        /// The new version row
        document_id: DocumentId,
        /// The owning idea
        idea_id: IdeaId,
        /// Artifact kind
        document_type: DocumentType,
        /// The claimed version
        version: DocumentVersion,
    },
    /// An analysis was recorded
    AnalysisRecorded {
        /// The new analysis
        analysis_id: AnalysisId,
        /// Its owner
        user_id: UserId,
        /// Variant discriminator ("idea" | "hackathon")
        kind: String,
    },
    /// Credits were deducted for a paid action
    CreditsDeducted {
        /// The ledger entry
        transaction_id: TransactionId,
        /// The charged user
        user_id: UserId,
        /// Signed amount (negative)
        amount: i64,
        /// The paid action
        action_id: String,
    },
    /// A failed paid action was refunded
    CreditsRefunded {
        /// The ledger entry
        transaction_id: TransactionId,
        /// The refunded user
        user_id: UserId,
        /// Signed amount (positive)
        amount: i64,
        /// The original action
        action_id: String,
    },
}

impl DomainEvent {
    /// Snake-case event name for routing and logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::IdeaCreated { .. } => "idea_created",
            Self::IdeaDeleted { .. } => "idea_deleted",
            Self::DocumentVersionCreated { .. } => "document_version_created",
            Self::AnalysisRecorded { .. } => "analysis_recorded",
            Self::CreditsDeducted { .. } => "credits_deducted",
            Self::CreditsRefunded { .. } => "credits_refunded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_types_are_stable() {
        let event = DomainEvent::IdeaCreated {
            idea_id: IdeaId::new(),
            user_id: UserId::new(),
        };
        assert_eq!(event.event_type(), "idea_created");
    }

    #[test]
    fn test_envelope_wraps_payload() {
        let event = DomainEvent::CreditsDeducted {
            transaction_id: TransactionId::new(),
            user_id: UserId::new(),
            amount: -5,
            action_id: "act-1".into(),
        };
        let envelope = EventEnvelope::wrap(&event).unwrap();
        assert_eq!(envelope.event_type, "credits_deducted");
        assert_eq!(envelope.payload["amount"], -5);
    }
}
