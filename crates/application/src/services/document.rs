//! Document use cases.
//!
//! Edits are append-only: each one claims the next version. A concurrent
//! editor who wins the slot first costs the loser one re-read-and-retry,
//! never an overwrite.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use ideaforge_domain::document::{Document, DocumentType};
use ideaforge_domain::errors::RepositoryError;
use ideaforge_domain::events::DomainEvent;
use ideaforge_domain::identifiers::IdeaId;
use ideaforge_domain::version::DocumentVersion;
use ideaforge_infrastructure::repositories::{DocumentCommands, DocumentQueries, IdeaQueries};

use super::{EventPublisher, ServiceContext};
use crate::validation::{GenerateDocumentRequest, Validatable};
use crate::{ApplicationError, ApplicationResult};

/// Use cases for versioned documents.
pub struct DocumentService<D, I, E>
where
    D: DocumentCommands + DocumentQueries,
    I: IdeaQueries,
    E: EventPublisher,
{
    repository: Arc<D>,
    ideas: Arc<I>,
    events: Arc<E>,
}

impl<D, I, E> DocumentService<D, I, E>
where
    D: DocumentCommands + DocumentQueries,
    I: IdeaQueries,
    E: EventPublisher,
{
    /// Wire a service to its collaborators.
    pub fn new(repository: Arc<D>, ideas: Arc<I>, events: Arc<E>) -> Self {
        Self {
            repository,
            ideas,
            events,
        }
    }

    /// Generate the first version of a document for an idea.
    ///
    /// Fails with `Conflict` when a document of this type already exists;
    /// use [`DocumentService::edit`] to revise it.
    #[instrument(skip(self, ctx, request), fields(request_id = %ctx.request_id))]
    pub async fn generate(
        &self,
        ctx: &ServiceContext,
        idea_id: IdeaId,
        request: GenerateDocumentRequest,
    ) -> ApplicationResult<Document> {
        request.validate_input()?;
        // the idea must exist and belong to the acting user
        self.ideas.find_by_id(idea_id, Some(ctx.user_id)).await?;

        let document = Document::new(
            idea_id,
            ctx.user_id,
            request.document_type,
            request.title,
            request.content,
        );
        self.repository.save(&document).await?;

        self.publish_version_event(&document);
        info!(document_id = %document.id, "Document generated");
        Ok(document)
    }

    /// Replace a document's content by appending the next version.
    ///
    /// A lost version race is retried once against the new latest version;
    /// a second loss surfaces as `Conflict` for the caller to handle.
    #[instrument(skip(self, ctx, title, content), fields(request_id = %ctx.request_id))]
    pub async fn edit(
        &self,
        ctx: &ServiceContext,
        idea_id: IdeaId,
        document_type: DocumentType,
        title: Option<String>,
        content: Option<serde_json::Value>,
    ) -> ApplicationResult<Document> {
        let latest = self
            .repository
            .find_latest_version(idea_id, document_type, ctx.user_id)
            .await?;
        let revision = latest.next_revision(title.clone(), content.clone());

        match self.repository.save(&revision).await {
            Ok(_) => {
                self.publish_version_event(&revision);
                Ok(revision)
            }
            Err(RepositoryError::ConstraintViolation(_)) => {
                debug!(
                    idea_id = %idea_id,
                    "Lost a version race; retrying against the new latest"
                );
                let latest = self
                    .repository
                    .find_latest_version(idea_id, document_type, ctx.user_id)
                    .await?;
                let retried = latest.next_revision(title, content);
                self.repository.save(&retried).await?;
                self.publish_version_event(&retried);
                Ok(retried)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Restore an earlier version by appending a new version with its
    /// content. History is never rewound.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn restore(
        &self,
        ctx: &ServiceContext,
        idea_id: IdeaId,
        document_type: DocumentType,
        version: DocumentVersion,
    ) -> ApplicationResult<Document> {
        let history = self
            .repository
            .find_all_versions(idea_id, document_type, ctx.user_id)
            .await?;
        let snapshot = history
            .iter()
            .find(|doc| doc.version == version)
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("version {version} of {document_type:?}"))
            })?;
        let latest = history.first().ok_or_else(|| {
            ApplicationError::NotFound(format!("any version of {document_type:?}"))
        })?;

        if latest.version == version {
            // restoring the latest is a no-op; hand it back unchanged
            return Ok(latest.clone());
        }

        let restored = latest.restored_from(snapshot);
        self.repository.save(&restored).await?;
        self.publish_version_event(&restored);
        info!(
            restored_from = %version,
            new_version = %restored.version,
            "Document version restored"
        );
        Ok(restored)
    }

    /// The authoritative current version of a (idea, type) pair.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn latest(
        &self,
        ctx: &ServiceContext,
        idea_id: IdeaId,
        document_type: DocumentType,
    ) -> ApplicationResult<Document> {
        Ok(self
            .repository
            .find_latest_version(idea_id, document_type, ctx.user_id)
            .await?)
    }

    /// The full version history, newest first.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn history(
        &self,
        ctx: &ServiceContext,
        idea_id: IdeaId,
        document_type: DocumentType,
    ) -> ApplicationResult<Vec<Document>> {
        Ok(self
            .repository
            .find_all_versions(idea_id, document_type, ctx.user_id)
            .await?)
    }

    fn publish_version_event(&self, document: &Document) {
        self.events.publish(DomainEvent::DocumentVersionCreated {
            document_id: document.id,
            idea_id: document.idea_id,
            document_type: document.document_type,
            version: document.version,
        });
    }
}
