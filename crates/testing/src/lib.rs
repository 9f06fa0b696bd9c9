//! Test support for IdeaForge.
//!
//! Fluent entity builders, fake-data fixtures, mock collaborators, and a
//! PostgreSQL test-database harness. Consumed as a dev-dependency by the
//! infrastructure and application crates.

pub mod builders;
pub mod database;
pub mod fixtures;
pub mod mocks;

pub use builders::{AnalysisBuilder, DocumentBuilder, IdeaBuilder, UserBuilder};
pub use database::{TestDatabase, SCHEMA};
pub use fixtures::{
    create_test_analysis, create_test_document, create_test_hackathon_analysis, create_test_idea,
    create_test_ledger, create_test_user,
};
pub use mocks::MockEventPublisher;
