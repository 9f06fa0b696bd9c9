//! Analysis repository.
//!
//! PostgreSQL-backed persistence for analyses. Analyses are audit-trail
//! records: they are recorded once and never deleted. The only mutation is
//! an explicit full re-score. The variant discriminator is written on
//! every insert and resolved first on every read.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use ideaforge_common::pagination::{DateRange, Page, PageRequest, SortDirection, SortParams};
use ideaforge_domain::analysis::Analysis;
use ideaforge_domain::errors::{RepoResult, RepositoryError};
use ideaforge_domain::identifiers::{AnalysisId, UserId};
use ideaforge_domain::locale::Locale;
use ideaforge_domain::score::Score;

use crate::mapping::{analysis_to_record, record_to_analysis, records_to_analyses};
use crate::records::{AnalysisRecord, KIND_HACKATHON, KIND_IDEA};

use super::{map_mapping_err, map_sqlx_err};

/// Variant filter for analysis searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKindFilter {
    /// Only idea analyses
    Idea,
    /// Only hackathon-project analyses
    Hackathon,
}

impl AnalysisKindFilter {
    fn discriminator(&self) -> &'static str {
        match self {
            Self::Idea => KIND_IDEA,
            Self::Hackathon => KIND_HACKATHON,
        }
    }
}

/// Filter and sort criteria for analysis searches.
#[derive(Debug, Clone, Default)]
pub struct AnalysisQuery {
    /// Restrict to one variant
    pub kind: Option<AnalysisKindFilter>,
    /// Restrict to one feedback locale
    pub locale: Option<Locale>,
    /// Lower score bound (inclusive)
    pub min_score: Option<Score>,
    /// Upper score bound (inclusive)
    pub max_score: Option<Score>,
    /// Restrict by creation time
    pub created: DateRange,
    /// Page to return
    pub pagination: PageRequest,
    /// Sort order
    pub sort: SortParams,
}

/// Write operations on analyses. There is deliberately no delete.
#[async_trait]
pub trait AnalysisCommands: Send + Sync {
    /// Record a new analysis.
    async fn record(&self, analysis: &Analysis) -> RepoResult<AnalysisId>;

    /// Record several analyses as one all-or-nothing operation.
    async fn record_many(&self, analyses: &[Analysis]) -> RepoResult<Vec<AnalysisId>>;

    /// Replace a stored analysis with an explicitly re-scored one.
    ///
    /// Full replacement, never a partial-field patch. Fails with
    /// `Unauthorized` when the requesting owner does not own the record.
    async fn rescore(&self, analysis: &Analysis, requesting_owner: UserId) -> RepoResult<()>;
}

/// Read operations on analyses.
#[async_trait]
pub trait AnalysisQueries: Send + Sync {
    /// Fetch one analysis. With a requesting owner supplied, foreign
    /// records are reported as `NotFound`.
    async fn find_by_id(
        &self,
        id: AnalysisId,
        requesting_owner: Option<UserId>,
    ) -> RepoResult<Analysis>;

    /// Page through one user's analyses, newest first.
    async fn list_by_user(&self, owner: UserId, page: PageRequest) -> RepoResult<Page<Analysis>>;

    /// Search one user's analyses by criteria.
    async fn search(&self, owner: UserId, query: AnalysisQuery) -> RepoResult<Page<Analysis>>;

    /// Count one user's analyses.
    async fn count_by_user(&self, owner: UserId) -> RepoResult<u64>;

    /// Whether an analysis row exists, regardless of owner.
    async fn exists(&self, id: AnalysisId) -> RepoResult<bool>;
}

/// PostgreSQL implementation of the analysis contracts.
pub struct PgAnalysisRepository {
    pool: PgPool,
}

const ANALYSIS_COLUMNS: &str =
    "id, user_id, kind, subject_text, score, locale, payload, created_at, updated_at";

impl PgAnalysisRepository {
    /// Create a repository bound to a pool handle.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn order_clause(sort: &SortParams) -> String {
        let column = match sort.field.as_str() {
            "score" => "score",
            "updated_at" => "updated_at",
            _ => "created_at",
        };
        let direction = match sort.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        format!("ORDER BY {column} {direction}")
    }
}

#[async_trait]
impl AnalysisCommands for PgAnalysisRepository {
    #[instrument(skip(self, analysis), fields(analysis_id = %analysis.id, kind = analysis.discriminator()))]
    async fn record(&self, analysis: &Analysis) -> RepoResult<AnalysisId> {
        let record = analysis_to_record(analysis);
        sqlx::query(
            r#"
            INSERT INTO analyses (
                id, user_id, kind, subject_text, score, locale, payload,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.kind)
        .bind(&record.subject_text)
        .bind(record.score)
        .bind(&record.locale)
        .bind(&record.payload)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        debug!(analysis_id = %analysis.id, "Analysis recorded");
        Ok(analysis.id)
    }

    #[instrument(skip(self, analyses), fields(count = analyses.len()))]
    async fn record_many(&self, analyses: &[Analysis]) -> RepoResult<Vec<AnalysisId>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;
        let mut ids = Vec::with_capacity(analyses.len());

        for analysis in analyses {
            let record = analysis_to_record(analysis);
            sqlx::query(
                r#"
                INSERT INTO analyses (
                    id, user_id, kind, subject_text, score, locale, payload,
                    created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(record.id)
            .bind(record.user_id)
            .bind(&record.kind)
            .bind(&record.subject_text)
            .bind(record.score)
            .bind(&record.locale)
            .bind(&record.payload)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
            ids.push(analysis.id);
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        debug!(count = ids.len(), "Analyses recorded in bulk");
        Ok(ids)
    }

    #[instrument(skip(self, analysis), fields(analysis_id = %analysis.id))]
    async fn rescore(&self, analysis: &Analysis, requesting_owner: UserId) -> RepoResult<()> {
        let owner = sqlx::query_scalar::<_, uuid::Uuid>(
            "SELECT user_id FROM analyses WHERE id = $1",
        )
        .bind(analysis.id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        match owner {
            None => return Err(RepositoryError::NotFound),
            Some(owner) if owner != *requesting_owner.as_uuid() => {
                return Err(RepositoryError::Unauthorized);
            }
            Some(_) => {}
        }

        let record = analysis_to_record(analysis);
        sqlx::query(
            r#"
            UPDATE analyses
            SET score = $2, payload = $3, locale = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(record.score)
        .bind(&record.payload)
        .bind(&record.locale)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        debug!(analysis_id = %analysis.id, "Analysis re-scored");
        Ok(())
    }
}

#[async_trait]
impl AnalysisQueries for PgAnalysisRepository {
    #[instrument(skip(self))]
    async fn find_by_id(
        &self,
        id: AnalysisId,
        requesting_owner: Option<UserId>,
    ) -> RepoResult<Analysis> {
        let record = sqlx::query_as::<_, AnalysisRecord>(&format!(
            "SELECT {ANALYSIS_COLUMNS} FROM analyses WHERE id = $1"
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

        record_to_analysis(record).map_err(map_mapping_err)
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, owner: UserId, page: PageRequest) -> RepoResult<Page<Analysis>> {
        let page = PageRequest::new(page.page, page.limit);

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM analyses WHERE user_id = $1")
                .bind(owner.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        let records = sqlx::query_as::<_, AnalysisRecord>(&format!(
            r#"
            SELECT {ANALYSIS_COLUMNS} FROM analyses
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

        let analyses = records_to_analyses(records).map_err(map_mapping_err)?;
        Ok(Page::from_request(analyses, &page, total as u64))
    }

    #[instrument(skip(self, query))]
    async fn search(&self, owner: UserId, query: AnalysisQuery) -> RepoResult<Page<Analysis>> {
        let page = PageRequest::new(query.pagination.page, query.pagination.limit);

        let mut conditions = vec!["user_id = $1".to_string()];
        let mut param = 1;

        if query.kind.is_some() {
            param += 1;
            conditions.push(format!("kind = ${param}"));
        }
        if query.locale.is_some() {
            param += 1;
            conditions.push(format!("locale = ${param}"));
        }
        if query.min_score.is_some() {
            param += 1;
            conditions.push(format!("score >= ${param}"));
        }
        if query.max_score.is_some() {
            param += 1;
            conditions.push(format!("score <= ${param}"));
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
                if let Some(kind) = query.kind {
                    q = q.bind(kind.discriminator());
                }
                if let Some(locale) = query.locale {
                    q = q.bind(locale.as_str());
                }
                if let Some(min) = query.min_score {
                    q = q.bind(f64::from(min.value()));
                }
                if let Some(max) = query.max_score {
                    q = q.bind(f64::from(max.value()));
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

        let count_sql = format!("SELECT COUNT(*) FROM analyses WHERE {where_clause}");
        let total: i64 = bind_filters!(sqlx::query_scalar(&count_sql))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let list_sql = format!(
            "SELECT {ANALYSIS_COLUMNS} FROM analyses WHERE {where_clause} {order_clause} LIMIT {} OFFSET {}",
            page.limit,
            page.offset()
        );
        let records = bind_filters!(sqlx::query_as::<_, AnalysisRecord>(&list_sql))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let analyses = records_to_analyses(records).map_err(map_mapping_err)?;
        Ok(Page::from_request(analyses, &page, total as u64))
    }

    #[instrument(skip(self))]
    async fn count_by_user(&self, owner: UserId) -> RepoResult<u64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM analyses WHERE user_id = $1")
                .bind(owner.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_err)?;
        Ok(count as u64)
    }

    #[instrument(skip(self))]
    async fn exists(&self, id: AnalysisId) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM analyses WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }
}
