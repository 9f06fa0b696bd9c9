//! In-memory implementation of every repository contract.
//!
//! Backed by `parking_lot`-locked maps over the same record shapes the
//! PostgreSQL implementation persists, and routed through the same mapping
//! layer, so contract tests exercise identical discriminator, cascade,
//! versioning, and ledger semantics without a database. Also the proof
//! that the contracts are store-agnostic.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use ideaforge_common::pagination::{Page, PageRequest, SortDirection, SortParams};
use ideaforge_domain::analysis::Analysis;
use ideaforge_domain::credit::{CreditTransaction, ACTION_ID_KEY};
use ideaforge_domain::document::{Document, DocumentType};
use ideaforge_domain::errors::{RepoResult, RepositoryError};
use ideaforge_domain::idea::Idea;
use ideaforge_domain::identifiers::{AnalysisId, DocumentId, IdeaId, TransactionId, UserId};
use ideaforge_domain::user::{User, UserPreferences, UserTier};

use crate::mapping::{
    analysis_to_record, document_to_record, idea_to_record, record_to_analysis,
    record_to_document, record_to_idea, record_to_transaction, record_to_user,
    records_to_analyses, records_to_documents, records_to_ideas, records_to_transactions,
    transaction_to_record, user_to_record,
};
use crate::records::{
    AnalysisRecord, CreditTransactionRecord, DocumentRecord, IdeaRecord, UserRecord,
};
use crate::repositories::{
    map_mapping_err, AnalysisCommands, AnalysisKindFilter, AnalysisQueries, AnalysisQuery,
    DocumentCommands, DocumentQueries, IdeaCommands, IdeaQueries, IdeaQuery, LedgerCommands,
    LedgerQueries, UserCommands, UserQueries,
};

/// Shared in-memory tables.
#[derive(Default)]
pub struct MemoryStore {
    ideas: RwLock<HashMap<Uuid, IdeaRecord>>,
    documents: RwLock<HashMap<Uuid, DocumentRecord>>,
    analyses: RwLock<HashMap<Uuid, AnalysisRecord>>,
    transactions: RwLock<Vec<CreditTransactionRecord>>,
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

fn paginate<T>(mut items: Vec<T>, page: &PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let start = (page.offset() as usize).min(items.len());
    let end = (start + page.limit as usize).min(items.len());
    let slice = items.drain(start..end).collect();
    Page::from_request(slice, page, total)
}

fn apply_direction<T>(items: &mut [T], direction: SortDirection) {
    if direction == SortDirection::Asc {
        items.reverse();
    }
}

fn sort_idea_records(records: &mut Vec<IdeaRecord>, sort: &SortParams) {
    match sort.field.as_str() {
        "updated_at" => records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        "status" => records.sort_by(|a, b| b.status.cmp(&a.status)),
        "text" => records.sort_by(|a, b| b.text.cmp(&a.text)),
        _ => records.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    apply_direction(records, sort.direction);
}

fn sort_analysis_records(records: &mut Vec<AnalysisRecord>, sort: &SortParams) {
    match sort.field.as_str() {
        "score" => records.sort_by(|a, b| b.score.total_cmp(&a.score)),
        "updated_at" => records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        _ => records.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    apply_direction(records, sort.direction);
}

// ---------------------------------------------------------------------------
// Ideas
// ---------------------------------------------------------------------------

/// In-memory idea repository.
pub struct MemoryIdeaRepository {
    store: Arc<MemoryStore>,
}

impl MemoryIdeaRepository {
    /// Bind a repository to a shared store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdeaCommands for MemoryIdeaRepository {
    async fn save(&self, idea: &Idea) -> RepoResult<IdeaId> {
        let record = idea_to_record(idea);
        let mut ideas = self.store.ideas.write();
        if ideas.contains_key(&record.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "duplicate idea id {}",
                record.id
            )));
        }
        ideas.insert(record.id, record);
        Ok(idea.id)
    }

    async fn save_many(&self, ideas: &[Idea]) -> RepoResult<Vec<IdeaId>> {
        let mut table = self.store.ideas.write();
        // all-or-nothing: check every id before inserting any
        for idea in ideas {
            if table.contains_key(idea.id.as_uuid()) {
                return Err(RepositoryError::ConstraintViolation(format!(
                    "duplicate idea id {}",
                    idea.id
                )));
            }
        }
        let mut ids = Vec::with_capacity(ideas.len());
        for idea in ideas {
            table.insert(*idea.id.as_uuid(), idea_to_record(idea));
            ids.push(idea.id);
        }
        Ok(ids)
    }

    async fn update(&self, idea: &Idea, requesting_owner: UserId) -> RepoResult<()> {
        let mut ideas = self.store.ideas.write();
        let stored = ideas
            .get(idea.id.as_uuid())
            .ok_or(RepositoryError::NotFound)?;
        if stored.user_id != *requesting_owner.as_uuid() {
            return Err(RepositoryError::Unauthorized);
        }
        ideas.insert(*idea.id.as_uuid(), idea_to_record(idea));
        Ok(())
    }

    async fn delete(&self, id: IdeaId, requesting_owner: UserId) -> RepoResult<bool> {
        let mut ideas = self.store.ideas.write();
        match ideas.get(id.as_uuid()) {
            None => return Ok(false),
            Some(stored) if stored.user_id != *requesting_owner.as_uuid() => {
                return Err(RepositoryError::Unauthorized);
            }
            Some(_) => {}
        }
        ideas.remove(id.as_uuid());
        // cascade: a document must never outlive its idea
        self.store
            .documents
            .write()
            .retain(|_, doc| doc.idea_id != *id.as_uuid());
        Ok(true)
    }

    async fn delete_many(&self, ids: &[IdeaId], requesting_owner: UserId) -> RepoResult<u64> {
        let ideas = self.store.ideas.read();
        // validate the whole batch first; partial deletion is failure
        for id in ids {
            if let Some(stored) = ideas.get(id.as_uuid()) {
                if stored.user_id != *requesting_owner.as_uuid() {
                    return Err(RepositoryError::Unauthorized);
                }
            }
        }
        drop(ideas);

        let mut removed = 0u64;
        let mut ideas = self.store.ideas.write();
        let mut documents = self.store.documents.write();
        for id in ids {
            if ideas.remove(id.as_uuid()).is_some() {
                documents.retain(|_, doc| doc.idea_id != *id.as_uuid());
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl IdeaQueries for MemoryIdeaRepository {
    async fn find_by_id(&self, id: IdeaId, requesting_owner: Option<UserId>) -> RepoResult<Idea> {
        let record = self
            .store
            .ideas
            .read()
            .get(id.as_uuid())
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        if let Some(owner) = requesting_owner {
            if record.user_id != *owner.as_uuid() {
                return Err(RepositoryError::NotFound);
            }
        }
        record_to_idea(record).map_err(map_mapping_err)
    }

    async fn list_by_owner(&self, owner: UserId, page: PageRequest) -> RepoResult<Page<Idea>> {
        let page = PageRequest::new(page.page, page.limit);
        let mut records: Vec<IdeaRecord> = self
            .store
            .ideas
            .read()
            .values()
            .filter(|r| r.user_id == *owner.as_uuid())
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let paged = paginate(records, &page);
        let total = paged.total;
        let ideas = records_to_ideas(paged.items).map_err(map_mapping_err)?;
        Ok(Page::from_request(ideas, &page, total))
    }

    async fn search(&self, owner: UserId, query: IdeaQuery) -> RepoResult<Page<Idea>> {
        let page = PageRequest::new(query.pagination.page, query.pagination.limit);
        let mut records: Vec<IdeaRecord> = self
            .store
            .ideas
            .read()
            .values()
            .filter(|r| r.user_id == *owner.as_uuid())
            .filter(|r| {
                query
                    .status
                    .map_or(true, |status| r.status == status.as_str())
            })
            .filter(|r| {
                query
                    .source
                    .map_or(true, |source| r.source == source.as_str())
            })
            .filter(|r| {
                query
                    .tag
                    .as_ref()
                    .map_or(true, |tag| r.tags.iter().any(|t| t == tag))
            })
            .filter(|r| {
                query.search_text.as_ref().map_or(true, |needle| {
                    r.text.to_lowercase().contains(&needle.to_lowercase())
                })
            })
            .filter(|r| query.created.contains(&r.created_at))
            .cloned()
            .collect();
        sort_idea_records(&mut records, &query.sort);

        let paged = paginate(records, &page);
        let total = paged.total;
        let ideas = records_to_ideas(paged.items).map_err(map_mapping_err)?;
        Ok(Page::from_request(ideas, &page, total))
    }

    async fn count_by_owner(&self, owner: UserId) -> RepoResult<u64> {
        Ok(self
            .store
            .ideas
            .read()
            .values()
            .filter(|r| r.user_id == *owner.as_uuid())
            .count() as u64)
    }

    async fn exists(&self, id: IdeaId) -> RepoResult<bool> {
        Ok(self.store.ideas.read().contains_key(id.as_uuid()))
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// In-memory document repository.
pub struct MemoryDocumentRepository {
    store: Arc<MemoryStore>,
}

impl MemoryDocumentRepository {
    /// Bind a repository to a shared store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    fn version_taken(
        documents: &HashMap<Uuid, DocumentRecord>,
        record: &DocumentRecord,
    ) -> bool {
        documents.values().any(|existing| {
            existing.idea_id == record.idea_id
                && existing.document_type == record.document_type
                && existing.version == record.version
        })
    }
}

#[async_trait]
impl DocumentCommands for MemoryDocumentRepository {
    async fn save(&self, document: &Document) -> RepoResult<DocumentId> {
        let record = document_to_record(document);
        let mut documents = self.store.documents.write();
        if Self::version_taken(&documents, &record) {
            // exactly one writer wins a version slot; the loser retries
            return Err(RepositoryError::ConstraintViolation(format!(
                "version {} already exists for ({}, {})",
                record.version, record.idea_id, record.document_type
            )));
        }
        documents.insert(record.id, record);
        Ok(document.id)
    }

    async fn save_many(&self, docs: &[Document]) -> RepoResult<Vec<DocumentId>> {
        let mut documents = self.store.documents.write();
        let records: Vec<DocumentRecord> = docs.iter().map(document_to_record).collect();
        for record in &records {
            if Self::version_taken(&documents, record) {
                return Err(RepositoryError::ConstraintViolation(format!(
                    "version {} already exists for ({}, {})",
                    record.version, record.idea_id, record.document_type
                )));
            }
        }
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            ids.push(DocumentId::from_uuid(record.id));
            documents.insert(record.id, record);
        }
        Ok(ids)
    }

    async fn delete(&self, id: DocumentId, requesting_owner: UserId) -> RepoResult<bool> {
        let mut documents = self.store.documents.write();
        match documents.get(id.as_uuid()) {
            None => return Ok(false),
            Some(stored) if stored.user_id != *requesting_owner.as_uuid() => {
                return Err(RepositoryError::Unauthorized);
            }
            Some(_) => {}
        }
        documents.remove(id.as_uuid());
        Ok(true)
    }

    async fn delete_by_idea(&self, idea_id: IdeaId, requesting_owner: UserId) -> RepoResult<u64> {
        let mut documents = self.store.documents.write();
        let before = documents.len();
        documents.retain(|_, doc| {
            !(doc.idea_id == *idea_id.as_uuid() && doc.user_id == *requesting_owner.as_uuid())
        });
        Ok((before - documents.len()) as u64)
    }
}

#[async_trait]
impl DocumentQueries for MemoryDocumentRepository {
    async fn find_by_id(
        &self,
        id: DocumentId,
        requesting_owner: Option<UserId>,
    ) -> RepoResult<Document> {
        let record = self
            .store
            .documents
            .read()
            .get(id.as_uuid())
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        if let Some(owner) = requesting_owner {
            if record.user_id != *owner.as_uuid() {
                return Err(RepositoryError::NotFound);
            }
        }
        record_to_document(record).map_err(map_mapping_err)
    }

    async fn find_by_idea_id(
        &self,
        idea_id: IdeaId,
        owner: UserId,
        page: PageRequest,
    ) -> RepoResult<Page<Document>> {
        let page = PageRequest::new(page.page, page.limit);
        let mut records: Vec<DocumentRecord> = self
            .store
            .documents
            .read()
            .values()
            .filter(|r| r.idea_id == *idea_id.as_uuid() && r.user_id == *owner.as_uuid())
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.version.cmp(&a.version))
        });

        let paged = paginate(records, &page);
        let total = paged.total;
        let documents = records_to_documents(paged.items).map_err(map_mapping_err)?;
        Ok(Page::from_request(documents, &page, total))
    }

    async fn find_latest_version(
        &self,
        idea_id: IdeaId,
        document_type: DocumentType,
        owner: UserId,
    ) -> RepoResult<Document> {
        let record = self
            .store
            .documents
            .read()
            .values()
            .filter(|r| {
                r.idea_id == *idea_id.as_uuid()
                    && r.document_type == document_type.as_str()
                    && r.user_id == *owner.as_uuid()
            })
            .max_by_key(|r| r.version)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        record_to_document(record).map_err(map_mapping_err)
    }

    async fn find_all_versions(
        &self,
        idea_id: IdeaId,
        document_type: DocumentType,
        owner: UserId,
    ) -> RepoResult<Vec<Document>> {
        let mut records: Vec<DocumentRecord> = self
            .store
            .documents
            .read()
            .values()
            .filter(|r| {
                r.idea_id == *idea_id.as_uuid()
                    && r.document_type == document_type.as_str()
                    && r.user_id == *owner.as_uuid()
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| b.version.cmp(&a.version));
        records_to_documents(records).map_err(map_mapping_err)
    }

    async fn count_versions(
        &self,
        idea_id: IdeaId,
        document_type: DocumentType,
    ) -> RepoResult<u64> {
        Ok(self
            .store
            .documents
            .read()
            .values()
            .filter(|r| {
                r.idea_id == *idea_id.as_uuid() && r.document_type == document_type.as_str()
            })
            .count() as u64)
    }

    async fn exists(&self, id: DocumentId) -> RepoResult<bool> {
        Ok(self.store.documents.read().contains_key(id.as_uuid()))
    }
}

// ---------------------------------------------------------------------------
// Analyses
// ---------------------------------------------------------------------------

/// In-memory analysis repository.
pub struct MemoryAnalysisRepository {
    store: Arc<MemoryStore>,
}

impl MemoryAnalysisRepository {
    /// Bind a repository to a shared store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AnalysisCommands for MemoryAnalysisRepository {
    async fn record(&self, analysis: &Analysis) -> RepoResult<AnalysisId> {
        let record = analysis_to_record(analysis);
        let mut analyses = self.store.analyses.write();
        if analyses.contains_key(&record.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "duplicate analysis id {}",
                record.id
            )));
        }
        analyses.insert(record.id, record);
        Ok(analysis.id)
    }

    async fn record_many(&self, items: &[Analysis]) -> RepoResult<Vec<AnalysisId>> {
        let mut analyses = self.store.analyses.write();
        for analysis in items {
            if analyses.contains_key(analysis.id.as_uuid()) {
                return Err(RepositoryError::ConstraintViolation(format!(
                    "duplicate analysis id {}",
                    analysis.id
                )));
            }
        }
        let mut ids = Vec::with_capacity(items.len());
        for analysis in items {
            analyses.insert(*analysis.id.as_uuid(), analysis_to_record(analysis));
            ids.push(analysis.id);
        }
        Ok(ids)
    }

    async fn rescore(&self, analysis: &Analysis, requesting_owner: UserId) -> RepoResult<()> {
        let mut analyses = self.store.analyses.write();
        let stored = analyses
            .get(analysis.id.as_uuid())
            .ok_or(RepositoryError::NotFound)?;
        if stored.user_id != *requesting_owner.as_uuid() {
            return Err(RepositoryError::Unauthorized);
        }
        analyses.insert(*analysis.id.as_uuid(), analysis_to_record(analysis));
        Ok(())
    }
}

#[async_trait]
impl AnalysisQueries for MemoryAnalysisRepository {
    async fn find_by_id(
        &self,
        id: AnalysisId,
        requesting_owner: Option<UserId>,
    ) -> RepoResult<Analysis> {
        let record = self
            .store
            .analyses
            .read()
            .get(id.as_uuid())
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        if let Some(owner) = requesting_owner {
            if record.user_id != *owner.as_uuid() {
                return Err(RepositoryError::NotFound);
            }
        }
        record_to_analysis(record).map_err(map_mapping_err)
    }

    async fn list_by_user(&self, owner: UserId, page: PageRequest) -> RepoResult<Page<Analysis>> {
        let page = PageRequest::new(page.page, page.limit);
        let mut records: Vec<AnalysisRecord> = self
            .store
            .analyses
            .read()
            .values()
            .filter(|r| r.user_id == *owner.as_uuid())
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let paged = paginate(records, &page);
        let total = paged.total;
        let analyses = records_to_analyses(paged.items).map_err(map_mapping_err)?;
        Ok(Page::from_request(analyses, &page, total))
    }

    async fn search(&self, owner: UserId, query: AnalysisQuery) -> RepoResult<Page<Analysis>> {
        let page = PageRequest::new(query.pagination.page, query.pagination.limit);
        let kind_filter = query.kind.map(|kind| match kind {
            AnalysisKindFilter::Idea => "idea",
            AnalysisKindFilter::Hackathon => "hackathon",
        });
        let mut records: Vec<AnalysisRecord> = self
            .store
            .analyses
            .read()
            .values()
            .filter(|r| r.user_id == *owner.as_uuid())
            .filter(|r| kind_filter.map_or(true, |kind| r.kind == kind))
            .filter(|r| query.locale.map_or(true, |locale| r.locale == locale.as_str()))
            .filter(|r| {
                query
                    .min_score
                    .map_or(true, |min| r.score >= f64::from(min.value()))
            })
            .filter(|r| {
                query
                    .max_score
                    .map_or(true, |max| r.score <= f64::from(max.value()))
            })
            .filter(|r| query.created.contains(&r.created_at))
            .cloned()
            .collect();
        sort_analysis_records(&mut records, &query.sort);

        let paged = paginate(records, &page);
        let total = paged.total;
        let analyses = records_to_analyses(paged.items).map_err(map_mapping_err)?;
        Ok(Page::from_request(analyses, &page, total))
    }

    async fn count_by_user(&self, owner: UserId) -> RepoResult<u64> {
        Ok(self
            .store
            .analyses
            .read()
            .values()
            .filter(|r| r.user_id == *owner.as_uuid())
            .count() as u64)
    }

    async fn exists(&self, id: AnalysisId) -> RepoResult<bool> {
        Ok(self.store.analyses.read().contains_key(id.as_uuid()))
    }
}

// ---------------------------------------------------------------------------
// Credit ledger
// ---------------------------------------------------------------------------

/// In-memory credit ledger repository.
pub struct MemoryCreditRepository {
    store: Arc<MemoryStore>,
}

impl MemoryCreditRepository {
    /// Bind a repository to a shared store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LedgerCommands for MemoryCreditRepository {
    async fn record(&self, tx: &CreditTransaction) -> RepoResult<TransactionId> {
        tx.tx_type.validate_amount(tx.amount)?;
        let record = transaction_to_record(tx);
        let mut transactions = self.store.transactions.write();
        if transactions.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "duplicate transaction id {}",
                record.id
            )));
        }
        transactions.push(record);
        Ok(tx.id)
    }

    async fn update(&self, tx: &CreditTransaction) -> RepoResult<()> {
        error!(
            transaction_id = %tx.id,
            "Attempted update of an append-only ledger entry"
        );
        Err(RepositoryError::ImmutableRecord)
    }

    async fn delete(&self, id: TransactionId) -> RepoResult<()> {
        error!(
            transaction_id = %id,
            "Attempted delete of an append-only ledger entry"
        );
        Err(RepositoryError::ImmutableRecord)
    }
}

#[async_trait]
impl LedgerQueries for MemoryCreditRepository {
    async fn balance(&self, user_id: UserId) -> RepoResult<i64> {
        Ok(self
            .store
            .transactions
            .read()
            .iter()
            .filter(|r| r.user_id == *user_id.as_uuid())
            .map(|r| r.amount)
            .sum())
    }

    async fn find_by_id(
        &self,
        id: TransactionId,
        requesting_owner: Option<UserId>,
    ) -> RepoResult<CreditTransaction> {
        let record = self
            .store
            .transactions
            .read()
            .iter()
            .find(|r| r.id == *id.as_uuid())
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        if let Some(owner) = requesting_owner {
            if record.user_id != *owner.as_uuid() {
                return Err(RepositoryError::NotFound);
            }
        }
        record_to_transaction(record).map_err(map_mapping_err)
    }

    async fn history(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> RepoResult<Page<CreditTransaction>> {
        let page = PageRequest::new(page.page, page.limit);
        let mut records: Vec<CreditTransactionRecord> = self
            .store
            .transactions
            .read()
            .iter()
            .filter(|r| r.user_id == *user_id.as_uuid())
            .cloned()
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let paged = paginate(records, &page);
        let total = paged.total;
        let transactions = records_to_transactions(paged.items).map_err(map_mapping_err)?;
        Ok(Page::from_request(transactions, &page, total))
    }

    async fn find_by_action(
        &self,
        user_id: UserId,
        action_id: &str,
    ) -> RepoResult<Vec<CreditTransaction>> {
        let mut records: Vec<CreditTransactionRecord> = self
            .store
            .transactions
            .read()
            .iter()
            .filter(|r| r.user_id == *user_id.as_uuid())
            .filter(|r| {
                r.metadata
                    .get(ACTION_ID_KEY)
                    .and_then(|v| v.as_str())
                    .is_some_and(|stamped| stamped == action_id)
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        records_to_transactions(records).map_err(map_mapping_err)
    }

    async fn has_refund_for_action(&self, user_id: UserId, action_id: &str) -> RepoResult<bool> {
        Ok(self
            .store
            .transactions
            .read()
            .iter()
            .filter(|r| r.user_id == *user_id.as_uuid() && r.tx_type == "refund")
            .any(|r| {
                r.metadata
                    .get(ACTION_ID_KEY)
                    .and_then(|v| v.as_str())
                    .is_some_and(|stamped| stamped == action_id)
            }))
    }

    async fn count(&self, user_id: UserId) -> RepoResult<u64> {
        Ok(self
            .store
            .transactions
            .read()
            .iter()
            .filter(|r| r.user_id == *user_id.as_uuid())
            .count() as u64)
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// In-memory user repository.
pub struct MemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl MemoryUserRepository {
    /// Bind a repository to a shared store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserCommands for MemoryUserRepository {
    async fn save(&self, user: &User) -> RepoResult<UserId> {
        let record = user_to_record(user);
        let mut users = self.store.users.write();
        if users.contains_key(&record.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "duplicate user id {}",
                record.id
            )));
        }
        users.insert(record.id, record);
        Ok(user.id)
    }

    async fn update_tier(&self, id: UserId, tier: UserTier) -> RepoResult<()> {
        let mut users = self.store.users.write();
        let record = users.get_mut(id.as_uuid()).ok_or(RepositoryError::NotFound)?;
        record.tier = tier.as_str().to_string();
        Ok(())
    }

    async fn update_preferences(
        &self,
        id: UserId,
        preferences: &UserPreferences,
    ) -> RepoResult<()> {
        let mut users = self.store.users.write();
        let record = users.get_mut(id.as_uuid()).ok_or(RepositoryError::NotFound)?;
        record.preferences = serde_json::to_value(preferences)
            .expect("preference serialization is infallible");
        Ok(())
    }
}

#[async_trait]
impl UserQueries for MemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> RepoResult<User> {
        let record = self
            .store
            .users
            .read()
            .get(id.as_uuid())
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        record_to_user(record).map_err(map_mapping_err)
    }

    async fn exists(&self, id: UserId) -> RepoResult<bool> {
        Ok(self.store.users.read().contains_key(id.as_uuid()))
    }

    async fn count(&self) -> RepoResult<u64> {
        Ok(self.store.users.read().len() as u64)
    }
}
