//! Storage record shapes.
//!
//! Each aggregate persists as one row: indexed scalar columns (owner id,
//! type discriminators, timestamps, the score) plus one opaque JSON
//! payload column for variant-specific data. The analysis discriminator
//! column is mandatory and written on every insert; it is never inferred
//! from the payload later.

use chrono::{DateTime, Utc};
use ideaforge_domain::category::Category;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminator value for idea analyses.
pub const KIND_IDEA: &str = "idea";

/// Discriminator value for hackathon-project analyses.
pub const KIND_HACKATHON: &str = "hackathon";

/// Row shape of the `ideas` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct IdeaRecord {
    /// Primary key
    pub id: Uuid,
    /// Owning user (indexed)
    pub user_id: Uuid,
    /// The idea text as submitted
    pub text: String,
    /// `manual` | `generated`
    pub source: String,
    /// Workflow status code
    pub status: String,
    /// Optional notes; NULL means never set
    pub notes: Option<String>,
    /// User-assigned tags
    pub tags: Vec<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `documents` table.
///
/// Uniqueness over (idea_id, document_type, version) serializes concurrent
/// edits racing for the same version slot.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DocumentRecord {
    /// Primary key of this version row
    pub id: Uuid,
    /// Owning idea (indexed)
    pub idea_id: Uuid,
    /// Owner, denormalized for ownership checks (indexed)
    pub user_id: Uuid,
    /// Artifact discriminator (`prd`, `roadmap`, ...)
    pub document_type: String,
    /// Display title
    pub title: String,
    /// Opaque generator payload
    pub content: serde_json::Value,
    /// Version number, starting at 1
    pub version: i32,
    /// Creation timestamp of this version row
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `analyses` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AnalysisRecord {
    /// Primary key
    pub id: Uuid,
    /// Owning user (indexed)
    pub user_id: Uuid,
    /// Variant discriminator: [`KIND_IDEA`] or [`KIND_HACKATHON`]
    pub kind: String,
    /// The analyzed text
    pub subject_text: String,
    /// Raw stored score; normalized on read (legacy rows may be 0-5)
    pub score: f64,
    /// Feedback language code
    pub locale: String,
    /// Variant-specific payload: feedback, suggestions, category
    pub payload: serde_json::Value,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last re-score timestamp
    pub updated_at: DateTime<Utc>,
}

/// JSON payload column of an [`AnalysisRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisPayload {
    /// Narrative feedback; omitted entirely when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Improvement suggestions
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Tagged category; present only for hackathon records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Row shape of the `credit_transactions` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CreditTransactionRecord {
    /// Primary key
    pub id: Uuid,
    /// User whose balance the entry affects (indexed)
    pub user_id: Uuid,
    /// Signed amount in whole credits
    pub amount: i64,
    /// `deduct` | `add` | `refund` | `admin_adjustment`
    pub tx_type: String,
    /// Human-readable reason
    pub description: String,
    /// Opaque key/value context
    pub metadata: serde_json::Value,
    /// When the balance change logically happened (indexed)
    pub timestamp: DateTime<Utc>,
    /// When the row was written
    pub created_at: DateTime<Utc>,
}

/// Row shape of the `users` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserRecord {
    /// Primary key
    pub id: Uuid,
    /// Subscription tier code
    pub tier: String,
    /// Preference payload; defaults apply to missing keys
    pub preferences: serde_json::Value,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}
