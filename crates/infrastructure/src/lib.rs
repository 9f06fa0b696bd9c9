//! Infrastructure layer for IdeaForge
//!
//! This crate provides:
//! - Storage record shapes (one row per aggregate: indexed scalars plus a
//!   JSON payload column)
//! - The mapping layer between entities and records, including
//!   discriminator resolution and score normalization
//! - Repository contracts split into command and query traits per
//!   aggregate
//! - PostgreSQL (sqlx) implementations of every contract
//! - An in-memory implementation of the same contracts, used by contract
//!   tests and proving the contracts are store-agnostic
//! - Database pool management and the per-request repository factory
//!
//! ## Architecture
//!
//! Repositories are created fresh per request through
//! [`database::RepositoryFactory`] and hold nothing but a pool handle.
//! Every operation returns `Result<_, RepositoryError>`; expected
//! conditions are typed values, integrity violations are logged at error
//! severity before being returned, and driver failures surface as
//! retryable `StoreUnavailable`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ideaforge_infrastructure::database::{DatabaseConfig, DatabasePool, RepositoryFactory};
//! use ideaforge_infrastructure::repositories::{IdeaCommands, IdeaQueries};
//!
//! let pool = DatabasePool::new(&DatabaseConfig::from_settings(&settings.database)).await?;
//! let factory = RepositoryFactory::new(&pool);
//!
//! // one factory call per request; repositories carry no cross-request state
//! let ideas = factory.ideas();
//! let mine = ideas.list_by_owner(user_id, Default::default()).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;
pub mod mapping;
pub mod memory;
pub mod records;
pub mod repositories;

pub use database::{DatabaseConfig, DatabasePool, HealthStatus, RepositoryFactory};
pub use memory::{
    MemoryAnalysisRepository, MemoryCreditRepository, MemoryDocumentRepository,
    MemoryIdeaRepository, MemoryStore, MemoryUserRepository,
};
pub use repositories::{
    AnalysisCommands, AnalysisKindFilter, AnalysisQueries, AnalysisQuery, DocumentCommands,
    DocumentQueries, IdeaCommands, IdeaQueries, IdeaQuery, LedgerCommands, LedgerQueries,
    PgAnalysisRepository, PgCreditRepository, PgDocumentRepository, PgIdeaRepository,
    PgUserRepository, UserCommands, UserQueries,
};
