//! IdeaForge Domain Types
//!
//! Core domain model for the IdeaForge platform: strongly-typed
//! identifiers, validated value objects, entities, domain events, and the
//! error taxonomy shared by every storage backend.
//!
//! ## Architecture
//!
//! - **identifiers**: UUID-v7 backed identifier newtypes per aggregate
//! - **score**: bounded 0-100 score plus the single scale-normalization rule
//! - **locale**: closed set of supported feedback languages
//! - **version**: linear document versioning, starting at 1
//! - **category**: tagged general/hackathon category values
//! - **idea**: the aggregate root owning generated documents
//! - **document**: append-only versioned artifacts scoped to an idea
//! - **analysis**: scored evaluations as one entity with a sealed variant
//! - **credit**: the append-only ledger and its pure balance function
//! - **user**: accounts, tiers, derived preferences
//! - **events**: serializable domain events
//! - **errors**: expected vs integrity vs transient failure taxonomy
//!
//! ## Usage
//!
//! ```rust
//! use ideaforge_domain::{
//!     idea::{Idea, IdeaSource},
//!     identifiers::UserId,
//!     score::Score,
//! };
//!
//! let idea = Idea::new(UserId::new(), "AI sous-chef", IdeaSource::Manual).unwrap();
//! assert!(idea.tags.is_empty());
//!
//! // Legacy 0-5-scale scores normalize through a single rule
//! assert_eq!(Score::from_raw(4.5).unwrap().value(), 90);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

// Core domain modules
pub mod analysis;
pub mod category;
pub mod credit;
pub mod document;
pub mod errors;
pub mod events;
pub mod idea;
pub mod identifiers;
pub mod locale;
pub mod score;
pub mod user;
pub mod version;

// Re-export commonly used types
pub use errors::{DomainResult, InvalidValue, MappingError, RepoResult, RepositoryError};
pub use identifiers::*;
pub use score::Score;
pub use version::DocumentVersion;

// Re-export key domain types
pub use analysis::{Analysis, AnalysisKind};
pub use category::{Category, HackathonTrack};
pub use credit::{CreditTransaction, TransactionType};
pub use document::{Document, DocumentType};
pub use idea::{Idea, IdeaSource, IdeaStatus};
pub use locale::Locale;
pub use user::{User, UserPreferences, UserTier};
