//! Fluent builders for constructing test entities.

use chrono::Utc;
use ideaforge_domain::analysis::Analysis;
use ideaforge_domain::category::{Category, HackathonTrack};
use ideaforge_domain::document::{Document, DocumentType};
use ideaforge_domain::idea::{Idea, IdeaSource, IdeaStatus};
use ideaforge_domain::identifiers::{IdeaId, UserId};
use ideaforge_domain::locale::Locale;
use ideaforge_domain::score::Score;
use ideaforge_domain::user::{User, UserPreferences, UserTier};
use ideaforge_domain::version::DocumentVersion;

/// Builder for [`Idea`] test instances.
#[derive(Clone)]
pub struct IdeaBuilder {
    user_id: UserId,
    text: String,
    source: IdeaSource,
    status: IdeaStatus,
    tags: Vec<String>,
    notes: Option<String>,
}

impl IdeaBuilder {
    pub fn new() -> Self {
        Self {
            user_id: UserId::new(),
            text: "An AI assistant that reviews rental contracts".to_string(),
            source: IdeaSource::Manual,
            status: IdeaStatus::Idea,
            tags: vec![],
            notes: None,
        }
    }

    pub fn with_owner(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn generated(mut self) -> Self {
        self.source = IdeaSource::Generated;
        self
    }

    pub fn with_status(mut self, status: IdeaStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> Idea {
        let mut idea =
            Idea::new(self.user_id, self.text, self.source).expect("builder text is non-empty");
        idea.status = self.status;
        idea.tags = self.tags;
        idea.notes = self.notes;
        idea
    }
}

impl Default for IdeaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Document`] test instances.
#[derive(Clone)]
pub struct DocumentBuilder {
    idea_id: IdeaId,
    user_id: UserId,
    document_type: DocumentType,
    title: String,
    content: serde_json::Value,
    version: DocumentVersion,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self {
            idea_id: IdeaId::new(),
            user_id: UserId::new(),
            document_type: DocumentType::Prd,
            title: "PRD".to_string(),
            content: serde_json::json!({"sections": []}),
            version: DocumentVersion::FIRST,
        }
    }

    pub fn for_idea(mut self, idea_id: IdeaId, user_id: UserId) -> Self {
        self.idea_id = idea_id;
        self.user_id = user_id;
        self
    }

    pub fn with_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = document_type;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = content;
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = DocumentVersion::new(version).expect("builder versions start at 1");
        self
    }

    pub fn build(self) -> Document {
        let mut document = Document::new(
            self.idea_id,
            self.user_id,
            self.document_type,
            self.title,
            self.content,
        );
        document.version = self.version;
        document
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Analysis`] test instances.
#[derive(Clone)]
pub struct AnalysisBuilder {
    user_id: UserId,
    subject_text: String,
    score: Score,
    locale: Locale,
    feedback: Option<String>,
    suggestions: Vec<String>,
    track: Option<HackathonTrack>,
}

impl AnalysisBuilder {
    pub fn new() -> Self {
        Self {
            user_id: UserId::new(),
            subject_text: "A marketplace for surplus restaurant meals".to_string(),
            score: Score::new(70).expect("70 is in bounds"),
            locale: Locale::En,
            feedback: Some("Clear demand, thin margins".to_string()),
            suggestions: vec!["Pilot with three restaurants".to_string()],
            track: None,
        }
    }

    pub fn with_owner(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_subject(mut self, subject_text: impl Into<String>) -> Self {
        self.subject_text = subject_text.into();
        self
    }

    pub fn with_score(mut self, score: u8) -> Self {
        self.score = Score::new(score).expect("builder scores are in bounds");
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn without_feedback(mut self) -> Self {
        self.feedback = None;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Switch to the hackathon variant on the given track.
    pub fn hackathon(mut self, track: HackathonTrack) -> Self {
        self.track = Some(track);
        self
    }

    pub fn build(self) -> Analysis {
        match self.track {
            Some(track) => Analysis::new_hackathon(
                self.user_id,
                self.subject_text,
                self.score,
                self.locale,
                self.feedback,
                self.suggestions,
                Category::hackathon(track),
            )
            .expect("builder input is valid"),
            None => Analysis::new_idea(
                self.user_id,
                self.subject_text,
                self.score,
                self.locale,
                self.feedback,
                self.suggestions,
            )
            .expect("builder input is valid"),
        }
    }
}

impl Default for AnalysisBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`User`] test instances.
#[derive(Clone)]
pub struct UserBuilder {
    id: UserId,
    tier: UserTier,
    preferences: UserPreferences,
}

impl UserBuilder {
    pub fn new() -> Self {
        Self {
            id: UserId::new(),
            tier: UserTier::Free,
            preferences: UserPreferences::default(),
        }
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    pub fn paid(mut self) -> Self {
        self.tier = UserTier::Paid;
        self
    }

    pub fn admin(mut self) -> Self {
        self.tier = UserTier::Admin;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.preferences.locale = locale;
        self
    }

    pub fn build(self) -> User {
        User {
            id: self.id,
            tier: self.tier,
            preferences: self.preferences,
            created_at: Utc::now(),
        }
    }
}

impl Default for UserBuilder {
    fn default() -> Self {
        Self::new()
    }
}
