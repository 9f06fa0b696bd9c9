//! Idea aggregate root.
//!
//! An [`Idea`] owns the lifecycle of every [`crate::document::Document`]
//! generated for it: deleting an idea cascades to its documents as part of
//! the same logical operation.

use crate::errors::{DomainResult, InvalidValue};
use crate::identifiers::{IdeaId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an idea entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaSource {
    /// Typed in by the user
    Manual,
    /// Produced by the idea generator
    Generated,
}

impl IdeaSource {
    /// The wire code for this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Generated => "generated",
        }
    }

    /// Parse a wire code.
    pub fn parse(s: &str) -> Result<Self, InvalidValue> {
        match s {
            "manual" => Ok(Self::Manual),
            "generated" => Ok(Self::Generated),
            other => Err(InvalidValue::UnknownIdeaSource(other.to_string())),
        }
    }
}

/// Where an idea is in the user's workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    /// Captured, not yet worked on
    Idea,
    /// Actively being developed
    InProgress,
    /// Shipped or otherwise done
    Completed,
    /// Parked
    Archived,
}

impl IdeaStatus {
    /// Every status.
    pub fn all() -> &'static [IdeaStatus] {
        &[Self::Idea, Self::InProgress, Self::Completed, Self::Archived]
    }

    /// The wire code for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    /// Parse a wire code.
    pub fn parse(s: &str) -> Result<Self, InvalidValue> {
        match s {
            "idea" => Ok(Self::Idea),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            other => Err(InvalidValue::UnknownIdeaStatus(other.to_string())),
        }
    }

    /// Whether the idea still shows up in active views.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Archived)
    }
}

/// A user's startup idea or hackathon project concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    /// Unique identifier
    pub id: IdeaId,
    /// Owning user; ideas are never shared
    pub user_id: UserId,
    /// The idea text as submitted
    pub text: String,
    /// How the idea entered the system
    pub source: IdeaSource,
    /// Workflow status
    pub status: IdeaStatus,
    /// Free-form user notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// User-assigned tags
    pub tags: Vec<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl Idea {
    /// Create a new idea in the initial status.
    pub fn new(user_id: UserId, text: impl Into<String>, source: IdeaSource) -> DomainResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(InvalidValue::EmptyText);
        }
        let now = Utc::now();
        Ok(Self {
            id: IdeaId::new(),
            user_id,
            text,
            source,
            status: IdeaStatus::Idea,
            notes: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Move the idea to a new workflow status.
    pub fn set_status(&mut self, status: IdeaStatus) {
        self.status = status;
        self.touch();
    }

    /// Replace the user's notes. `None` clears them.
    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes.filter(|n| !n.trim().is_empty());
        self.touch();
    }

    /// Replace the tag set, deduplicating while preserving order.
    pub fn set_tags(&mut self, tags: Vec<String>) {
        let mut seen = std::collections::HashSet::new();
        self.tags = tags
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .filter(|t| seen.insert(t.clone()))
            .collect();
        self.touch();
    }

    /// Whether the given user owns this idea.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_idea_starts_in_idea_status() {
        let idea = Idea::new(UserId::new(), "AI-powered meal planner", IdeaSource::Manual).unwrap();
        assert_eq!(idea.status, IdeaStatus::Idea);
        assert!(idea.notes.is_none());
        assert!(idea.tags.is_empty());
    }

    #[test]
    fn test_new_idea_rejects_empty_text() {
        assert!(Idea::new(UserId::new(), "  ", IdeaSource::Manual).is_err());
    }

    #[test]
    fn test_set_status_touches_updated_at() {
        let mut idea =
            Idea::new(UserId::new(), "marketplace for 3d prints", IdeaSource::Generated).unwrap();
        let before = idea.updated_at;
        idea.set_status(IdeaStatus::InProgress);
        assert_eq!(idea.status, IdeaStatus::InProgress);
        assert!(idea.updated_at >= before);
    }

    #[test]
    fn test_set_notes_clears_blank_input() {
        let mut idea = Idea::new(UserId::new(), "x-ray for code reviews", IdeaSource::Manual).unwrap();
        idea.set_notes(Some("worth pursuing".into()));
        assert_eq!(idea.notes.as_deref(), Some("worth pursuing"));
        idea.set_notes(Some("   ".into()));
        assert!(idea.notes.is_none());
    }

    #[test]
    fn test_set_tags_deduplicates() {
        let mut idea = Idea::new(UserId::new(), "smart standup bot", IdeaSource::Manual).unwrap();
        idea.set_tags(vec!["saas".into(), "ai".into(), "saas".into(), "".into()]);
        assert_eq!(idea.tags, vec!["saas".to_string(), "ai".to_string()]);
    }

    #[test]
    fn test_ownership_check() {
        let owner = UserId::new();
        let idea = Idea::new(owner, "browser-based daw", IdeaSource::Manual).unwrap();
        assert!(idea.is_owned_by(owner));
        assert!(!idea.is_owned_by(UserId::new()));
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in IdeaStatus::all() {
            assert_eq!(IdeaStatus::parse(status.as_str()).unwrap(), *status);
        }
        assert!(IdeaStatus::parse("paused").is_err());
    }
}
