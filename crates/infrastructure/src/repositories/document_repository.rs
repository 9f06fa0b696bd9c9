//! Document repository.
//!
//! PostgreSQL-backed persistence for versioned documents. Versions are
//! append-only rows; a uniqueness constraint on
//! (idea_id, document_type, version) serializes concurrent edits racing
//! for the same slot: exactly one insert wins, the loser observes a
//! `ConstraintViolation` and may retry against the new latest version.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use ideaforge_common::pagination::{Page, PageRequest};
use ideaforge_domain::document::{Document, DocumentType};
use ideaforge_domain::errors::{RepoResult, RepositoryError};
use ideaforge_domain::identifiers::{DocumentId, IdeaId, UserId};

use crate::mapping::{document_to_record, record_to_document, records_to_documents};
use crate::records::DocumentRecord;

use super::{map_mapping_err, map_sqlx_err};

/// Write operations on documents.
#[async_trait]
pub trait DocumentCommands: Send + Sync {
    /// Insert one document version.
    ///
    /// Inserting a (idea, type, version) triple that already exists fails
    /// with `ConstraintViolation`; the caller lost a version race and
    /// must re-read the latest version before retrying.
    async fn save(&self, document: &Document) -> RepoResult<DocumentId>;

    /// Insert several document versions as one all-or-nothing operation.
    async fn save_many(&self, documents: &[Document]) -> RepoResult<Vec<DocumentId>>;

    /// Delete a single version row. Foreign ownership fails with
    /// `Unauthorized`; an absent row returns `Ok(false)`.
    async fn delete(&self, id: DocumentId, requesting_owner: UserId) -> RepoResult<bool>;

    /// Delete every document scoped to an idea; returns the removed count.
    async fn delete_by_idea(&self, idea_id: IdeaId, requesting_owner: UserId) -> RepoResult<u64>;
}

/// Read operations on documents.
#[async_trait]
pub trait DocumentQueries: Send + Sync {
    /// Fetch one version row. With a requesting owner supplied, foreign
    /// records are reported as `NotFound`.
    async fn find_by_id(
        &self,
        id: DocumentId,
        requesting_owner: Option<UserId>,
    ) -> RepoResult<Document>;

    /// Page through every document row of an idea, newest first.
    async fn find_by_idea_id(
        &self,
        idea_id: IdeaId,
        owner: UserId,
        page: PageRequest,
    ) -> RepoResult<Page<Document>>;

    /// The authoritative current version of a (idea, type) pair.
    async fn find_latest_version(
        &self,
        idea_id: IdeaId,
        document_type: DocumentType,
        owner: UserId,
    ) -> RepoResult<Document>;

    /// The full version history of a (idea, type) pair, newest first.
    async fn find_all_versions(
        &self,
        idea_id: IdeaId,
        document_type: DocumentType,
        owner: UserId,
    ) -> RepoResult<Vec<Document>>;

    /// How many versions a (idea, type) pair has.
    async fn count_versions(
        &self,
        idea_id: IdeaId,
        document_type: DocumentType,
    ) -> RepoResult<u64>;

    /// Whether a document row exists, regardless of owner.
    async fn exists(&self, id: DocumentId) -> RepoResult<bool>;
}

/// PostgreSQL implementation of the document contracts.
pub struct PgDocumentRepository {
    pool: PgPool,
}

const DOCUMENT_COLUMNS: &str =
    "id, idea_id, user_id, document_type, title, content, version, created_at, updated_at";

impl PgDocumentRepository {
    /// Create a repository bound to a pool handle.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentCommands for PgDocumentRepository {
    #[instrument(skip(self, document), fields(document_id = %document.id, version = %document.version))]
    async fn save(&self, document: &Document) -> RepoResult<DocumentId> {
        let record = document_to_record(document);
        sqlx::query(
            r#"
            INSERT INTO documents (
                id, idea_id, user_id, document_type, title, content, version,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id)
        .bind(record.idea_id)
        .bind(record.user_id)
        .bind(&record.document_type)
        .bind(&record.title)
        .bind(&record.content)
        .bind(record.version)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        debug!(document_id = %document.id, version = %document.version, "Document version saved");
        Ok(document.id)
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn save_many(&self, documents: &[Document]) -> RepoResult<Vec<DocumentId>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;
        let mut ids = Vec::with_capacity(documents.len());

        for document in documents {
            let record = document_to_record(document);
            sqlx::query(
                r#"
                INSERT INTO documents (
                    id, idea_id, user_id, document_type, title, content, version,
                    created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(record.id)
            .bind(record.idea_id)
            .bind(record.user_id)
            .bind(&record.document_type)
            .bind(&record.title)
            .bind(&record.content)
            .bind(record.version)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
            ids.push(document.id);
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        debug!(count = ids.len(), "Document versions saved in bulk");
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: DocumentId, requesting_owner: UserId) -> RepoResult<bool> {
        let owner =
            sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM documents WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        match owner {
            None => return Ok(false),
            Some(owner) if owner != *requesting_owner.as_uuid() => {
                return Err(RepositoryError::Unauthorized);
            }
            Some(_) => {}
        }

        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn delete_by_idea(&self, idea_id: IdeaId, requesting_owner: UserId) -> RepoResult<u64> {
        let removed = sqlx::query("DELETE FROM documents WHERE idea_id = $1 AND user_id = $2")
            .bind(idea_id.as_uuid())
            .bind(requesting_owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .rows_affected();

        debug!(idea_id = %idea_id, removed, "Documents deleted for idea");
        Ok(removed)
    }
}

#[async_trait]
impl DocumentQueries for PgDocumentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(
        &self,
        id: DocumentId,
        requesting_owner: Option<UserId>,
    ) -> RepoResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or(RepositoryError::NotFound)?;

        if let Some(owner) = requesting_owner {
            if record.user_id != *owner.as_uuid() {
                return Err(RepositoryError::NotFound);
            }
        }

        record_to_document(record).map_err(map_mapping_err)
    }

    #[instrument(skip(self))]
    async fn find_by_idea_id(
        &self,
        idea_id: IdeaId,
        owner: UserId,
        page: PageRequest,
    ) -> RepoResult<Page<Document>> {
        let page = PageRequest::new(page.page, page.limit);

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM documents WHERE idea_id = $1 AND user_id = $2",
        )
        .bind(idea_id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let records = sqlx::query_as::<_, DocumentRecord>(&format!(
            r#"
            SELECT {DOCUMENT_COLUMNS} FROM documents
            WHERE idea_id = $1 AND user_id = $2
            ORDER BY created_at DESC, version DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(idea_id.as_uuid())
        .bind(owner.as_uuid())
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let documents = records_to_documents(records).map_err(map_mapping_err)?;
        Ok(Page::from_request(documents, &page, total as u64))
    }

    #[instrument(skip(self))]
    async fn find_latest_version(
        &self,
        idea_id: IdeaId,
        document_type: DocumentType,
        owner: UserId,
    ) -> RepoResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(&format!(
            r#"
            SELECT {DOCUMENT_COLUMNS} FROM documents
            WHERE idea_id = $1 AND document_type = $2 AND user_id = $3
            ORDER BY version DESC
            LIMIT 1
            "#
        ))
        .bind(idea_id.as_uuid())
        .bind(document_type.as_str())
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or(RepositoryError::NotFound)?;

        record_to_document(record).map_err(map_mapping_err)
    }

    #[instrument(skip(self))]
    async fn find_all_versions(
        &self,
        idea_id: IdeaId,
        document_type: DocumentType,
        owner: UserId,
    ) -> RepoResult<Vec<Document>> {
        let records = sqlx::query_as::<_, DocumentRecord>(&format!(
            r#"
            SELECT {DOCUMENT_COLUMNS} FROM documents
            WHERE idea_id = $1 AND document_type = $2 AND user_id = $3
            ORDER BY version DESC
            "#
        ))
        .bind(idea_id.as_uuid())
        .bind(document_type.as_str())
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records_to_documents(records).map_err(map_mapping_err)
    }

    #[instrument(skip(self))]
    async fn count_versions(
        &self,
        idea_id: IdeaId,
        document_type: DocumentType,
    ) -> RepoResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM documents WHERE idea_id = $1 AND document_type = $2",
        )
        .bind(idea_id.as_uuid())
        .bind(document_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(count as u64)
    }

    #[instrument(skip(self))]
    async fn exists(&self, id: DocumentId) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM documents WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }
}
