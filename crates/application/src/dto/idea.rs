//! Idea DTO.

use chrono::{DateTime, Utc};
use ideaforge_domain::idea::Idea;
use serde::Serialize;

/// Flattened view of an idea.
#[derive(Debug, Clone, Serialize)]
pub struct IdeaDto {
    /// Idea id
    pub id: String,
    /// The idea text
    pub text: String,
    /// `manual` | `generated`
    pub source: String,
    /// Workflow status code
    pub status: String,
    /// User notes, when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// User tags
    pub tags: Vec<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Idea> for IdeaDto {
    fn from(idea: Idea) -> Self {
        Self {
            id: idea.id.to_string(),
            text: idea.text,
            source: idea.source.as_str().to_string(),
            status: idea.status.as_str().to_string(),
            notes: idea.notes,
            tags: idea.tags,
            created_at: idea.created_at,
            updated_at: idea.updated_at,
        }
    }
}
