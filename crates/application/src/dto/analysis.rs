//! Analysis DTO.

use chrono::{DateTime, Utc};
use ideaforge_domain::analysis::{Analysis, AnalysisKind};
use serde::Serialize;

/// Flattened view of an analysis. The variant is exposed as a string
/// discriminator plus an optional category label, matching the stored
/// shape consumers already understand.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisDto {
    /// Analysis id
    pub id: String,
    /// `idea` | `hackathon`
    pub kind: String,
    /// The analyzed text
    pub subject_text: String,
    /// Score on the 0-100 scale
    pub score: u8,
    /// Feedback language code
    pub locale: String,
    /// Narrative feedback, when the scorer returned any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Improvement suggestions
    pub suggestions: Vec<String>,
    /// Competition-track label; present only for hackathon analyses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last re-score timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Analysis> for AnalysisDto {
    fn from(analysis: Analysis) -> Self {
        let kind = analysis.discriminator().to_string();
        let category = match &analysis.kind {
            AnalysisKind::Idea => None,
            AnalysisKind::Hackathon { category } => Some(category.label().to_string()),
        };
        Self {
            id: analysis.id.to_string(),
            kind,
            subject_text: analysis.subject_text,
            score: analysis.score.value(),
            locale: analysis.locale.as_str().to_string(),
            feedback: analysis.feedback,
            suggestions: analysis.suggestions,
            category,
            created_at: analysis.created_at,
            updated_at: analysis.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ideaforge_domain::category::{Category, HackathonTrack};
    use ideaforge_domain::identifiers::UserId;
    use ideaforge_domain::locale::Locale;
    use ideaforge_domain::score::Score;

    #[test]
    fn test_hackathon_dto_carries_the_track_label() {
        let analysis = Analysis::new_hackathon(
            UserId::new(),
            "offline-first field notes",
            Score::new(74).unwrap(),
            Locale::En,
            None,
            vec![],
            Category::hackathon(HackathonTrack::Mobile),
        )
        .unwrap();

        let dto = AnalysisDto::from(analysis);
        assert_eq!(dto.kind, "hackathon");
        assert_eq!(dto.category.as_deref(), Some("mobile"));
    }

    #[test]
    fn test_idea_dto_has_no_category() {
        let analysis = Analysis::new_idea(
            UserId::new(),
            "virtual try-on for glasses",
            Score::new(62).unwrap(),
            Locale::En,
            None,
            vec![],
        )
        .unwrap();

        let dto = AnalysisDto::from(analysis);
        assert_eq!(dto.kind, "idea");
        assert!(dto.category.is_none());
    }
}
