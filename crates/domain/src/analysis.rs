//! Scored analyses of ideas and hackathon projects.
//!
//! An [`Analysis`] is one entity with a sealed [`AnalysisKind`] variant,
//! not two classes: the variant is persisted as an explicit discriminator
//! and resolved with exhaustive pattern matching at the mapping boundary.
//! Analyses are immutable once recorded except for a full re-score; there
//! is no partial-field patching.

use crate::category::Category;
use crate::errors::{DomainResult, InvalidValue};
use crate::identifiers::{AnalysisId, UserId};
use crate::locale::Locale;
use crate::score::Score;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which kind of subject was analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisKind {
    /// A startup idea; carries no extra fields
    Idea,
    /// A hackathon project; carries its competition-track category
    Hackathon {
        /// Competition track the project was judged against.
        /// Always the hackathon-tagged [`Category`] variant.
        category: Category,
    },
}

impl AnalysisKind {
    /// Discriminator value persisted for this variant.
    pub fn discriminator(&self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::Hackathon { .. } => "hackathon",
        }
    }
}

/// A scored evaluation returned by the external analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Unique identifier
    pub id: AnalysisId,
    /// User the analysis was produced for
    pub user_id: UserId,
    /// The text that was analyzed, as submitted
    pub subject_text: String,
    /// Overall score on the 0-100 scale
    pub score: Score,
    /// Language of the feedback
    pub locale: Locale,
    /// Narrative feedback; absent when the service returned none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Concrete improvement suggestions
    pub suggestions: Vec<String>,
    /// Idea vs hackathon variant
    #[serde(flatten)]
    pub kind: AnalysisKind,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last re-score timestamp
    pub updated_at: DateTime<Utc>,
}

impl Analysis {
    /// Record an analysis of a startup idea.
    pub fn new_idea(
        user_id: UserId,
        subject_text: impl Into<String>,
        score: Score,
        locale: Locale,
        feedback: Option<String>,
        suggestions: Vec<String>,
    ) -> DomainResult<Self> {
        Self::build(user_id, subject_text, score, locale, feedback, suggestions, AnalysisKind::Idea)
    }

    /// Record an analysis of a hackathon project on a given track.
    pub fn new_hackathon(
        user_id: UserId,
        subject_text: impl Into<String>,
        score: Score,
        locale: Locale,
        feedback: Option<String>,
        suggestions: Vec<String>,
        category: Category,
    ) -> DomainResult<Self> {
        if !category.is_hackathon() {
            return Err(InvalidValue::ExpectedHackathonCategory(
                category.label().to_string(),
            ));
        }
        Self::build(
            user_id,
            subject_text,
            score,
            locale,
            feedback,
            suggestions,
            AnalysisKind::Hackathon { category },
        )
    }

    fn build(
        user_id: UserId,
        subject_text: impl Into<String>,
        score: Score,
        locale: Locale,
        feedback: Option<String>,
        suggestions: Vec<String>,
        kind: AnalysisKind,
    ) -> DomainResult<Self> {
        let subject_text = subject_text.into();
        if subject_text.trim().is_empty() {
            return Err(InvalidValue::EmptyText);
        }
        let now = Utc::now();
        Ok(Self {
            id: AnalysisId::new(),
            user_id,
            subject_text,
            score,
            locale,
            feedback: feedback.filter(|f| !f.trim().is_empty()),
            suggestions,
            kind,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the scored result wholesale after an explicit re-score.
    ///
    /// This is the only mutation an analysis supports; the variant and
    /// subject text never change.
    pub fn rescore(&mut self, score: Score, feedback: Option<String>, suggestions: Vec<String>) {
        self.score = score;
        self.feedback = feedback.filter(|f| !f.trim().is_empty());
        self.suggestions = suggestions;
        self.updated_at = Utc::now();
    }

    /// Whether the given user owns this analysis.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Discriminator value persisted for this analysis.
    pub fn discriminator(&self) -> &'static str {
        self.kind.discriminator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::HackathonTrack;

    fn score(v: u8) -> Score {
        Score::new(v).unwrap()
    }

    #[test]
    fn test_idea_variant_has_no_category() {
        let analysis = Analysis::new_idea(
            UserId::new(),
            "drone delivery for pharmacies",
            score(72),
            Locale::En,
            Some("strong market, hard regulation".into()),
            vec!["start with rural areas".into()],
        )
        .unwrap();
        assert_eq!(analysis.discriminator(), "idea");
        assert!(matches!(analysis.kind, AnalysisKind::Idea));
    }

    #[test]
    fn test_hackathon_variant_requires_hackathon_category() {
        let general = Category::general("fintech").unwrap();
        let err = Analysis::new_hackathon(
            UserId::new(),
            "realtime pair-programming arena",
            score(85),
            Locale::En,
            None,
            vec![],
            general,
        );
        assert!(err.is_err());

        let ok = Analysis::new_hackathon(
            UserId::new(),
            "realtime pair-programming arena",
            score(85),
            Locale::En,
            None,
            vec![],
            Category::hackathon(HackathonTrack::Web),
        )
        .unwrap();
        assert_eq!(ok.discriminator(), "hackathon");
    }

    #[test]
    fn test_blank_feedback_maps_to_absent() {
        let analysis = Analysis::new_idea(
            UserId::new(),
            "subscription tool sharing",
            score(40),
            Locale::Es,
            Some("   ".into()),
            vec![],
        )
        .unwrap();
        assert!(analysis.feedback.is_none());
    }

    #[test]
    fn test_rescore_replaces_wholesale() {
        let mut analysis = Analysis::new_idea(
            UserId::new(),
            "calendar that says no",
            score(55),
            Locale::En,
            Some("unclear wedge".into()),
            vec!["narrow the persona".into()],
        )
        .unwrap();
        analysis.rescore(score(68), None, vec!["focus on executives".into()]);
        assert_eq!(analysis.score.value(), 68);
        assert!(analysis.feedback.is_none());
        assert_eq!(analysis.suggestions.len(), 1);
    }

    #[test]
    fn test_rejects_empty_subject() {
        assert!(Analysis::new_idea(UserId::new(), "", score(50), Locale::En, None, vec![]).is_err());
    }
}
