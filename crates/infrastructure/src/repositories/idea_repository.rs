//! Idea repository.
//!
//! PostgreSQL-backed persistence for the idea aggregate root. Deleting an
//! idea removes every document scoped to it inside the same transaction;
//! a document outliving its idea is a corruption, not a tolerated state.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use ideaforge_common::pagination::{DateRange, Page, PageRequest, SortDirection, SortParams};
use ideaforge_domain::errors::{RepoResult, RepositoryError};
use ideaforge_domain::idea::{Idea, IdeaSource, IdeaStatus};
use ideaforge_domain::identifiers::{IdeaId, UserId};

use crate::mapping::{idea_to_record, record_to_idea, records_to_ideas};
use crate::records::IdeaRecord;

use super::{map_mapping_err, map_sqlx_err};

/// Filter and sort criteria for idea searches. All filters are optional
/// and combine with AND.
#[derive(Debug, Clone, Default)]
pub struct IdeaQuery {
    /// Restrict to one workflow status
    pub status: Option<IdeaStatus>,
    /// Restrict to one submission source
    pub source: Option<IdeaSource>,
    /// Require a tag
    pub tag: Option<String>,
    /// Substring match against the idea text
    pub search_text: Option<String>,
    /// Restrict by creation time
    pub created: DateRange,
    /// Page to return
    pub pagination: PageRequest,
    /// Sort order
    pub sort: SortParams,
}

/// Write operations on ideas.
#[async_trait]
pub trait IdeaCommands: Send + Sync {
    /// Insert a new idea.
    async fn save(&self, idea: &Idea) -> RepoResult<IdeaId>;

    /// Insert several ideas as one all-or-nothing operation.
    async fn save_many(&self, ideas: &[Idea]) -> RepoResult<Vec<IdeaId>>;

    /// Replace a stored idea's mutable fields. Fails with `Unauthorized`
    /// when the requesting owner does not own the record.
    async fn update(&self, idea: &Idea, requesting_owner: UserId) -> RepoResult<()>;

    /// Delete an idea and, atomically, every document scoped to it.
    ///
    /// Idempotent: deleting an absent idea returns `Ok(false)`. Deleting
    /// another user's idea fails with `Unauthorized`.
    async fn delete(&self, id: IdeaId, requesting_owner: UserId) -> RepoResult<bool>;

    /// Delete several ideas (with their documents) as one all-or-nothing
    /// operation; returns how many ideas existed and were removed.
    async fn delete_many(&self, ids: &[IdeaId], requesting_owner: UserId) -> RepoResult<u64>;
}

/// Read operations on ideas.
#[async_trait]
pub trait IdeaQueries: Send + Sync {
    /// Fetch one idea. With a requesting owner supplied, a record owned by
    /// someone else is reported as `NotFound`.
    async fn find_by_id(&self, id: IdeaId, requesting_owner: Option<UserId>) -> RepoResult<Idea>;

    /// Page through one user's ideas, newest first.
    async fn list_by_owner(&self, owner: UserId, page: PageRequest) -> RepoResult<Page<Idea>>;

    /// Search one user's ideas by criteria.
    async fn search(&self, owner: UserId, query: IdeaQuery) -> RepoResult<Page<Idea>>;

    /// Count one user's ideas.
    async fn count_by_owner(&self, owner: UserId) -> RepoResult<u64>;

    /// Whether an idea row exists, regardless of owner.
    async fn exists(&self, id: IdeaId) -> RepoResult<bool>;
}

/// PostgreSQL implementation of the idea contracts.
pub struct PgIdeaRepository {
    pool: PgPool,
}

impl PgIdeaRepository {
    /// Create a repository bound to a pool handle.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the stored owner of an idea, if the row exists.
    async fn stored_owner(&self, id: IdeaId) -> RepoResult<Option<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM ideas WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }

    fn order_clause(sort: &SortParams) -> String {
        let column = match sort.field.as_str() {
            "updated_at" => "updated_at",
            "status" => "status",
            "text" => "text",
            _ => "created_at",
        };
        let direction = match sort.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        format!("ORDER BY {column} {direction}")
    }
}

const IDEA_COLUMNS: &str = "id, user_id, text, source, status, notes, tags, created_at, updated_at";

#[async_trait]
impl IdeaCommands for PgIdeaRepository {
    #[instrument(skip(self, idea), fields(idea_id = %idea.id))]
    async fn save(&self, idea: &Idea) -> RepoResult<IdeaId> {
        let record = idea_to_record(idea);
        sqlx::query(
            r#"
            INSERT INTO ideas (id, user_id, text, source, status, notes, tags, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.text)
        .bind(&record.source)
        .bind(&record.status)
        .bind(&record.notes)
        .bind(&record.tags)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        debug!(idea_id = %idea.id, "Idea saved");
        Ok(idea.id)
    }

    #[instrument(skip(self, ideas), fields(count = ideas.len()))]
    async fn save_many(&self, ideas: &[Idea]) -> RepoResult<Vec<IdeaId>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;
        let mut ids = Vec::with_capacity(ideas.len());

        for idea in ideas {
            let record = idea_to_record(idea);
            sqlx::query(
                r#"
                INSERT INTO ideas (id, user_id, text, source, status, notes, tags, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(record.id)
            .bind(record.user_id)
            .bind(&record.text)
            .bind(&record.source)
            .bind(&record.status)
            .bind(&record.notes)
            .bind(&record.tags)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
            ids.push(idea.id);
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        debug!(count = ids.len(), "Ideas saved in bulk");
        Ok(ids)
    }

    #[instrument(skip(self, idea), fields(idea_id = %idea.id))]
    async fn update(&self, idea: &Idea, requesting_owner: UserId) -> RepoResult<()> {
        match self.stored_owner(idea.id).await? {
            None => return Err(RepositoryError::NotFound),
            Some(owner) if owner != *requesting_owner.as_uuid() => {
                return Err(RepositoryError::Unauthorized);
            }
            Some(_) => {}
        }

        let record = idea_to_record(idea);
        sqlx::query(
            r#"
            UPDATE ideas
            SET text = $2, status = $3, notes = $4, tags = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(&record.text)
        .bind(&record.status)
        .bind(&record.notes)
        .bind(&record.tags)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        debug!(idea_id = %idea.id, "Idea updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: IdeaId, requesting_owner: UserId) -> RepoResult<bool> {
        match self.stored_owner(id).await? {
            None => return Ok(false),
            Some(owner) if owner != *requesting_owner.as_uuid() => {
                return Err(RepositoryError::Unauthorized);
            }
            Some(_) => {}
        }

        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let documents_removed = sqlx::query("DELETE FROM documents WHERE idea_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?
            .rows_affected();

        sqlx::query("DELETE FROM ideas WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;
        debug!(idea_id = %id, documents_removed, "Idea deleted with cascade");
        Ok(true)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete_many(&self, ids: &[IdeaId], requesting_owner: UserId) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;
        let mut removed = 0u64;

        for id in ids {
            let owner = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM ideas WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;

            match owner {
                None => continue,
                Some(owner) if owner != *requesting_owner.as_uuid() => {
                    // rolls the whole batch back; partial deletion is
                    // reported as failure, not success
                    return Err(RepositoryError::Unauthorized);
                }
                Some(_) => {}
            }

            sqlx::query("DELETE FROM documents WHERE idea_id = $1")
                .bind(id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
            sqlx::query("DELETE FROM ideas WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
            removed += 1;
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        debug!(removed, "Ideas deleted in bulk");
        Ok(removed)
    }
}

#[async_trait]
impl IdeaQueries for PgIdeaRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: IdeaId, requesting_owner: Option<UserId>) -> RepoResult<Idea> {
        let record = sqlx::query_as::<_, IdeaRecord>(&format!(
            "SELECT {IDEA_COLUMNS} FROM ideas WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or(RepositoryError::NotFound)?;

        if let Some(owner) = requesting_owner {
            if record.user_id != *owner.as_uuid() {
                // foreign records must be indistinguishable from absent ones
                return Err(RepositoryError::NotFound);
            }
        }

        record_to_idea(record).map_err(map_mapping_err)
    }

    #[instrument(skip(self))]
    async fn list_by_owner(&self, owner: UserId, page: PageRequest) -> RepoResult<Page<Idea>> {
        let page = PageRequest::new(page.page, page.limit);

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ideas WHERE user_id = $1")
            .bind(owner.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let records = sqlx::query_as::<_, IdeaRecord>(&format!(
            r#"
            SELECT {IDEA_COLUMNS} FROM ideas
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner.as_uuid())
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let ideas = records_to_ideas(records).map_err(map_mapping_err)?;
        Ok(Page::from_request(ideas, &page, total as u64))
    }

    #[instrument(skip(self, query))]
    async fn search(&self, owner: UserId, query: IdeaQuery) -> RepoResult<Page<Idea>> {
        let page = PageRequest::new(query.pagination.page, query.pagination.limit);

        let mut conditions = vec!["user_id = $1".to_string()];
        let mut param = 1;

        if query.status.is_some() {
            param += 1;
            conditions.push(format!("status = ${param}"));
        }
        if query.source.is_some() {
            param += 1;
            conditions.push(format!("source = ${param}"));
        }
        if query.tag.is_some() {
            param += 1;
            conditions.push(format!("${param} = ANY(tags)"));
        }
        if query.search_text.is_some() {
            param += 1;
            conditions.push(format!("text ILIKE ${param}"));
        }
        if query.created.start.is_some() {
            param += 1;
            conditions.push(format!("created_at >= ${param}"));
        }
        if query.created.end.is_some() {
            param += 1;
            conditions.push(format!("created_at <= ${param}"));
        }

        let where_clause = conditions.join(" AND ");
        let order_clause = Self::order_clause(&query.sort);

        macro_rules! bind_filters {
            ($q:expr) => {{
                let mut q = $q.bind(owner.as_uuid());
                if let Some(ref status) = query.status {
                    q = q.bind(status.as_str());
                }
                if let Some(ref source) = query.source {
                    q = q.bind(source.as_str());
                }
                if let Some(ref tag) = query.tag {
                    q = q.bind(tag);
                }
                if let Some(ref text) = query.search_text {
                    q = q.bind(format!("%{text}%"));
                }
                if let Some(start) = query.created.start {
                    q = q.bind(start);
                }
                if let Some(end) = query.created.end {
                    q = q.bind(end);
                }
                q
            }};
        }

        let count_sql = format!("SELECT COUNT(*) FROM ideas WHERE {where_clause}");
        let total: i64 = bind_filters!(sqlx::query_scalar(&count_sql))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let list_sql = format!(
            "SELECT {IDEA_COLUMNS} FROM ideas WHERE {where_clause} {order_clause} LIMIT {} OFFSET {}",
            page.limit,
            page.offset()
        );
        let records = bind_filters!(sqlx::query_as::<_, IdeaRecord>(&list_sql))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let ideas = records_to_ideas(records).map_err(map_mapping_err)?;
        Ok(Page::from_request(ideas, &page, total as u64))
    }

    #[instrument(skip(self))]
    async fn count_by_owner(&self, owner: UserId) -> RepoResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ideas WHERE user_id = $1")
            .bind(owner.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(count as u64)
    }

    #[instrument(skip(self))]
    async fn exists(&self, id: IdeaId) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM ideas WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }
}
