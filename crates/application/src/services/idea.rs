//! Idea use cases.

use std::sync::Arc;
use tracing::{info, instrument};

use ideaforge_common::pagination::{Page, PageRequest};
use ideaforge_domain::events::DomainEvent;
use ideaforge_domain::idea::Idea;
use ideaforge_domain::identifiers::IdeaId;
use ideaforge_infrastructure::repositories::{
    DocumentQueries, IdeaCommands, IdeaQueries, IdeaQuery,
};

use super::{EventPublisher, ServiceContext};
use crate::validation::{CreateIdeaRequest, UpdateIdeaRequest, Validatable};
use crate::ApplicationResult;

/// Use cases for the idea aggregate.
pub struct IdeaService<R, D, E>
where
    R: IdeaCommands + IdeaQueries,
    D: DocumentQueries,
    E: EventPublisher,
{
    repository: Arc<R>,
    documents: Arc<D>,
    events: Arc<E>,
}

impl<R, D, E> IdeaService<R, D, E>
where
    R: IdeaCommands + IdeaQueries,
    D: DocumentQueries,
    E: EventPublisher,
{
    /// Wire a service to its collaborators.
    pub fn new(repository: Arc<R>, documents: Arc<D>, events: Arc<E>) -> Self {
        Self {
            repository,
            documents,
            events,
        }
    }

    /// Create an idea for the acting user.
    #[instrument(skip(self, ctx, request), fields(request_id = %ctx.request_id))]
    pub async fn create(
        &self,
        ctx: &ServiceContext,
        request: CreateIdeaRequest,
    ) -> ApplicationResult<Idea> {
        request.validate_input()?;

        let mut idea = Idea::new(ctx.user_id, request.text, request.source)?;
        idea.set_tags(request.tags);
        self.repository.save(&idea).await?;

        self.events.publish(DomainEvent::IdeaCreated {
            idea_id: idea.id,
            user_id: ctx.user_id,
        });
        info!(idea_id = %idea.id, "Idea created");
        Ok(idea)
    }

    /// Fetch one of the acting user's ideas.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn get(&self, ctx: &ServiceContext, id: IdeaId) -> ApplicationResult<Idea> {
        Ok(self.repository.find_by_id(id, Some(ctx.user_id)).await?)
    }

    /// Page through the acting user's ideas.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn list(
        &self,
        ctx: &ServiceContext,
        page: PageRequest,
    ) -> ApplicationResult<Page<Idea>> {
        Ok(self.repository.list_by_owner(ctx.user_id, page).await?)
    }

    /// Search the acting user's ideas.
    #[instrument(skip(self, ctx, query), fields(request_id = %ctx.request_id))]
    pub async fn search(
        &self,
        ctx: &ServiceContext,
        query: IdeaQuery,
    ) -> ApplicationResult<Page<Idea>> {
        Ok(self.repository.search(ctx.user_id, query).await?)
    }

    /// Apply a partial update to one of the acting user's ideas.
    #[instrument(skip(self, ctx, request), fields(request_id = %ctx.request_id))]
    pub async fn update(
        &self,
        ctx: &ServiceContext,
        id: IdeaId,
        request: UpdateIdeaRequest,
    ) -> ApplicationResult<Idea> {
        request.validate_input()?;

        let mut idea = self.repository.find_by_id(id, Some(ctx.user_id)).await?;
        if let Some(status) = request.status {
            idea.set_status(status);
        }
        if let Some(notes) = request.notes {
            idea.set_notes(Some(notes));
        }
        if let Some(tags) = request.tags {
            idea.set_tags(tags);
        }
        self.repository.update(&idea, ctx.user_id).await?;
        Ok(idea)
    }

    /// Delete one of the acting user's ideas; every document scoped to it
    /// goes with it in the same repository operation.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn delete(&self, ctx: &ServiceContext, id: IdeaId) -> ApplicationResult<bool> {
        // count before the cascade so the event can report what fell
        let documents_removed = self
            .documents
            .find_by_idea_id(id, ctx.user_id, PageRequest::new(1, 1))
            .await?
            .total;

        let existed = self.repository.delete(id, ctx.user_id).await?;
        if existed {
            self.events.publish(DomainEvent::IdeaDeleted {
                idea_id: id,
                user_id: ctx.user_id,
                documents_removed,
            });
            info!(idea_id = %id, documents_removed, "Idea deleted");
        }
        Ok(existed)
    }
}
