//! Input-shape validation for caller-supplied requests.
//!
//! Value objects already guarantee domain invariants; this layer rejects
//! obviously malformed request shapes (empty text, oversized payloads)
//! before any repository work happens.

use crate::{ApplicationError, ApplicationResult};
use ideaforge_domain::document::DocumentType;
use ideaforge_domain::idea::{IdeaSource, IdeaStatus};
use serde::Deserialize;
use validator::Validate;

/// Anything that can check its own shape.
pub trait Validatable {
    /// Reject the request if its shape is invalid.
    fn validate_input(&self) -> ApplicationResult<()>;
}

impl<T: Validate> Validatable for T {
    fn validate_input(&self) -> ApplicationResult<()> {
        self.validate()
            .map_err(|e| ApplicationError::ValidationFailed(e.to_string()))
    }
}

/// Request to create an idea.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIdeaRequest {
    /// The idea text
    #[validate(length(min = 1, max = 10000))]
    pub text: String,

    /// How the idea entered the system
    pub source: IdeaSource,

    /// Initial tags
    #[serde(default)]
    #[validate(length(max = 20))]
    pub tags: Vec<String>,
}

/// Request to update an idea's mutable fields. Absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateIdeaRequest {
    /// New workflow status
    pub status: Option<IdeaStatus>,

    /// Replacement notes; `Some("")` clears them
    #[validate(length(max = 5000))]
    pub notes: Option<String>,

    /// Replacement tag set
    #[validate(length(max = 20))]
    pub tags: Option<Vec<String>>,
}

/// Request to generate the first version of a document.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateDocumentRequest {
    /// Which artifact to generate
    pub document_type: DocumentType,

    /// Display title
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Generator payload
    pub content: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_rejects_empty_text() {
        let request = CreateIdeaRequest {
            text: String::new(),
            source: IdeaSource::Manual,
            tags: vec![],
        };
        assert!(request.validate_input().is_err());
    }

    #[test]
    fn test_create_request_accepts_normal_input() {
        let request = CreateIdeaRequest {
            text: "An API for carbon accounting".to_string(),
            source: IdeaSource::Manual,
            tags: vec!["climate".to_string()],
        };
        assert!(request.validate_input().is_ok());
    }

    #[test]
    fn test_generate_request_rejects_blank_title() {
        let request = GenerateDocumentRequest {
            document_type: DocumentType::Prd,
            title: String::new(),
            content: json!({}),
        };
        assert!(request.validate_input().is_err());
    }

    #[test]
    fn test_update_request_defaults_touch_nothing() {
        let request = UpdateIdeaRequest::default();
        assert!(request.validate_input().is_ok());
        assert!(request.status.is_none());
        assert!(request.notes.is_none());
        assert!(request.tags.is_none());
    }
}
