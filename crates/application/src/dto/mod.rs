//! Data transfer objects.
//!
//! Flattened, JSON-serializable views of entities for the presentation
//! layer. Conversion needs no store-specific knowledge; the mapping layer
//! already normalized everything.

mod analysis;
mod common;
mod credit;
mod document;
mod idea;
mod user;

pub use analysis::AnalysisDto;
pub use common::ApiPage;
pub use credit::{BalanceDto, TransactionDto};
pub use document::{DocumentDto, DocumentVersionSummary};
pub use idea::IdeaDto;
pub use user::UserDto;
