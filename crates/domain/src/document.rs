//! Versioned documents generated for an idea.
//!
//! Every edit of a document appends a new row at `version = latest + 1`;
//! rows are never overwritten or deleted by an edit. Restoring an old
//! version is itself a new version whose content equals the restored
//! snapshot, so the history stays strictly append-only.

use crate::errors::InvalidValue;
use crate::identifiers::{DocumentId, IdeaId, UserId};
use crate::version::DocumentVersion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kinds of artifacts the generator can produce for an idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Stored analysis write-up
    Analysis,
    /// Product requirements document
    Prd,
    /// Technical design document
    TechnicalDesign,
    /// Architecture overview
    Architecture,
    /// Delivery roadmap
    Roadmap,
}

impl DocumentType {
    /// Every document type.
    pub fn all() -> &'static [DocumentType] {
        &[
            Self::Analysis,
            Self::Prd,
            Self::TechnicalDesign,
            Self::Architecture,
            Self::Roadmap,
        ]
    }

    /// The wire code for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Prd => "prd",
            Self::TechnicalDesign => "technical_design",
            Self::Architecture => "architecture",
            Self::Roadmap => "roadmap",
        }
    }

    /// Parse a wire code.
    pub fn parse(s: &str) -> Result<Self, InvalidValue> {
        match s {
            "analysis" => Ok(Self::Analysis),
            "prd" => Ok(Self::Prd),
            "technical_design" => Ok(Self::TechnicalDesign),
            "architecture" => Ok(Self::Architecture),
            "roadmap" => Ok(Self::Roadmap),
            other => Err(InvalidValue::UnknownDocumentType(other.to_string())),
        }
    }
}

/// One version of a generated document, scoped to a single idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier of this version row
    pub id: DocumentId,
    /// The idea this document belongs to
    pub idea_id: IdeaId,
    /// Owner, denormalized from the idea for ownership checks
    pub user_id: UserId,
    /// Which artifact this is
    pub document_type: DocumentType,
    /// Display title
    pub title: String,
    /// Opaque structured payload produced by the generator
    pub content: serde_json::Value,
    /// Position in the edit history, starting at 1
    pub version: DocumentVersion,
    /// Creation timestamp of this version row
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create the first version of a document.
    pub fn new(
        idea_id: IdeaId,
        user_id: UserId,
        document_type: DocumentType,
        title: impl Into<String>,
        content: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new(),
            idea_id,
            user_id,
            document_type,
            title: title.into(),
            content,
            version: DocumentVersion::FIRST,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the next version from this one.
    ///
    /// Fields the caller does not override are carried forward; the new
    /// row gets a fresh id, `version + 1`, and fresh timestamps. The
    /// receiver is left untouched; prior versions are history.
    #[must_use]
    pub fn next_revision(
        &self,
        title: Option<String>,
        content: Option<serde_json::Value>,
    ) -> Document {
        let now = Utc::now();
        Document {
            id: DocumentId::new(),
            idea_id: self.idea_id,
            user_id: self.user_id,
            document_type: self.document_type,
            title: title.unwrap_or_else(|| self.title.clone()),
            content: content.unwrap_or_else(|| self.content.clone()),
            version: self.version.next(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a new version whose content equals an older snapshot.
    ///
    /// `self` must be the latest version; `snapshot` the version being
    /// restored. History stays append-only: nothing is rewound.
    #[must_use]
    pub fn restored_from(&self, snapshot: &Document) -> Document {
        self.next_revision(Some(snapshot.title.clone()), Some(snapshot.content.clone()))
    }

    /// Whether the given user owns this document.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Document {
        Document::new(
            IdeaId::new(),
            UserId::new(),
            DocumentType::Prd,
            "PRD: meal planner",
            json!({"sections": ["problem", "solution"]}),
        )
    }

    #[test]
    fn test_new_document_is_version_one() {
        let d = doc();
        assert_eq!(d.version, DocumentVersion::FIRST);
    }

    #[test]
    fn test_next_revision_increments_and_carries_forward() {
        let v1 = doc();
        let v2 = v1.next_revision(None, Some(json!({"sections": ["problem"]})));

        assert_eq!(v2.version.value(), 2);
        assert_eq!(v2.title, v1.title);
        assert_ne!(v2.id, v1.id);
        assert_ne!(v2.content, v1.content);
        // the receiver is untouched
        assert_eq!(v1.version.value(), 1);
    }

    #[test]
    fn test_restore_is_a_new_version_with_old_content() {
        let v1 = doc();
        let v2 = v1.next_revision(None, Some(json!({"a": 2})));
        let v3 = v2.restored_from(&v1);

        assert_eq!(v3.version.value(), 3);
        assert_eq!(v3.content, v1.content);
        assert_eq!(v3.title, v1.title);
    }

    #[test]
    fn test_document_type_parse_roundtrip() {
        for ty in DocumentType::all() {
            assert_eq!(DocumentType::parse(ty.as_str()).unwrap(), *ty);
        }
        assert!(DocumentType::parse("pitch_deck").is_err());
    }
}
