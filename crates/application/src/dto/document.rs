//! Document DTOs.

use chrono::{DateTime, Utc};
use ideaforge_domain::document::Document;
use serde::Serialize;

/// Flattened view of one document version.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentDto {
    /// Version row id
    pub id: String,
    /// Owning idea id
    pub idea_id: String,
    /// Artifact kind code
    pub document_type: String,
    /// Display title
    pub title: String,
    /// Generator payload
    pub content: serde_json::Value,
    /// Version number
    pub version: u32,
    /// Creation timestamp of this version
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentDto {
    fn from(document: Document) -> Self {
        Self {
            id: document.id.to_string(),
            idea_id: document.idea_id.to_string(),
            document_type: document.document_type.as_str().to_string(),
            title: document.title,
            content: document.content,
            version: document.version.value(),
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }
}

/// Lightweight history entry for version pickers and diff views.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentVersionSummary {
    /// Version row id
    pub id: String,
    /// Version number
    pub version: u32,
    /// Display title at that version
    pub title: String,
    /// When the version was created
    pub created_at: DateTime<Utc>,
}

impl From<&Document> for DocumentVersionSummary {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id.to_string(),
            version: document.version.value(),
            title: document.title.clone(),
            created_at: document.created_at,
        }
    }
}
