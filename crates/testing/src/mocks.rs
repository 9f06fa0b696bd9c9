//! Mock collaborators for tests that need to observe side effects.

use ideaforge_domain::events::DomainEvent;
use parking_lot::RwLock;
use std::sync::Arc;

/// Records every published domain event for later assertions.
pub struct MockEventPublisher {
    published: Arc<RwLock<Vec<DomainEvent>>>,
}

impl MockEventPublisher {
    pub fn new() -> Self {
        Self {
            published: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Record an event.
    pub fn publish(&self, event: DomainEvent) {
        self.published.write().push(event);
    }

    /// Every event published so far.
    pub fn published_events(&self) -> Vec<DomainEvent> {
        self.published.read().clone()
    }

    /// Event-type names in publish order.
    pub fn event_types(&self) -> Vec<&'static str> {
        self.published.read().iter().map(|e| e.event_type()).collect()
    }

    /// Number of published events.
    pub fn event_count(&self) -> usize {
        self.published.read().len()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.published.write().clear();
    }
}

impl Default for MockEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ideaforge_domain::identifiers::{IdeaId, UserId};

    #[test]
    fn test_publisher_records_in_order() {
        let publisher = MockEventPublisher::new();
        publisher.publish(DomainEvent::IdeaCreated {
            idea_id: IdeaId::new(),
            user_id: UserId::new(),
        });
        publisher.publish(DomainEvent::IdeaDeleted {
            idea_id: IdeaId::new(),
            user_id: UserId::new(),
            documents_removed: 2,
        });

        assert_eq!(publisher.event_types(), vec!["idea_created", "idea_deleted"]);
        assert_eq!(publisher.event_count(), 2);

        publisher.clear();
        assert_eq!(publisher.event_count(), 0);
    }
}
