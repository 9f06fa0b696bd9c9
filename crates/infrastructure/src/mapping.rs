//! Bidirectional, lossless conversion between entities and storage records.
//!
//! Reading resolves the persisted discriminator FIRST and rejects any
//! record whose discriminator and payload shape disagree: a hackathon row
//! without a category (or an idea row with one) is a [`MappingError`], not
//! a best-effort guess. Missing optional fields map to `None`, never an
//! empty-string sentinel. Batch conversions short-circuit on the first
//! failure, which carries the offending record's id.

use ideaforge_domain::analysis::{Analysis, AnalysisKind};
use ideaforge_domain::category::Category;
use ideaforge_domain::credit::CreditTransaction;
use ideaforge_domain::document::{Document, DocumentType};
use ideaforge_domain::errors::MappingError;
use ideaforge_domain::idea::{Idea, IdeaSource, IdeaStatus};
use ideaforge_domain::identifiers::{AnalysisId, DocumentId, IdeaId, TransactionId, UserId};
use ideaforge_domain::locale::Locale;
use ideaforge_domain::score::Score;
use ideaforge_domain::user::{User, UserPreferences, UserTier};
use ideaforge_domain::version::DocumentVersion;
use indexmap::IndexMap;

use crate::records::{
    AnalysisPayload, AnalysisRecord, CreditTransactionRecord, DocumentRecord, IdeaRecord,
    UserRecord, KIND_HACKATHON, KIND_IDEA,
};

// ---------------------------------------------------------------------------
// Idea
// ---------------------------------------------------------------------------

/// Flatten an idea into its row shape. Total for valid entities.
pub fn idea_to_record(idea: &Idea) -> IdeaRecord {
    IdeaRecord {
        id: idea.id.into_uuid(),
        user_id: idea.user_id.into_uuid(),
        text: idea.text.clone(),
        source: idea.source.as_str().to_string(),
        status: idea.status.as_str().to_string(),
        notes: idea.notes.clone(),
        tags: idea.tags.clone(),
        created_at: idea.created_at,
        updated_at: idea.updated_at,
    }
}

/// Rebuild an idea from its row shape.
pub fn record_to_idea(record: IdeaRecord) -> Result<Idea, MappingError> {
    let source = IdeaSource::parse(&record.source)
        .map_err(|e| MappingError::invalid_stored(record.id, e))?;
    let status = IdeaStatus::parse(&record.status)
        .map_err(|e| MappingError::invalid_stored(record.id, e))?;

    Ok(Idea {
        id: IdeaId::from_uuid(record.id),
        user_id: UserId::from_uuid(record.user_id),
        text: record.text,
        source,
        status,
        notes: record.notes.filter(|n| !n.trim().is_empty()),
        tags: record.tags,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

/// Batch conversion, short-circuiting on the first failing record.
pub fn records_to_ideas(records: Vec<IdeaRecord>) -> Result<Vec<Idea>, MappingError> {
    records.into_iter().map(record_to_idea).collect()
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Flatten a document version into its row shape.
pub fn document_to_record(document: &Document) -> DocumentRecord {
    DocumentRecord {
        id: document.id.into_uuid(),
        idea_id: document.idea_id.into_uuid(),
        user_id: document.user_id.into_uuid(),
        document_type: document.document_type.as_str().to_string(),
        title: document.title.clone(),
        content: document.content.clone(),
        version: document.version.value() as i32,
        created_at: document.created_at,
        updated_at: document.updated_at,
    }
}

/// Rebuild a document version from its row shape.
pub fn record_to_document(record: DocumentRecord) -> Result<Document, MappingError> {
    let document_type = DocumentType::parse(&record.document_type)
        .map_err(|e| MappingError::invalid_stored(record.id, e))?;
    let version = DocumentVersion::try_from(i64::from(record.version))
        .map_err(|e| MappingError::invalid_stored(record.id, e))?;

    Ok(Document {
        id: DocumentId::from_uuid(record.id),
        idea_id: IdeaId::from_uuid(record.idea_id),
        user_id: UserId::from_uuid(record.user_id),
        document_type,
        title: record.title,
        content: record.content,
        version,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

/// Batch conversion, short-circuiting on the first failing record.
pub fn records_to_documents(records: Vec<DocumentRecord>) -> Result<Vec<Document>, MappingError> {
    records.into_iter().map(record_to_document).collect()
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Flatten an analysis into its row shape.
///
/// The discriminator column is written from the entity's variant, never
/// left to be inferred from the payload later. Scores are written on the
/// canonical 0-100 scale.
pub fn analysis_to_record(analysis: &Analysis) -> AnalysisRecord {
    let category = match &analysis.kind {
        AnalysisKind::Idea => None,
        AnalysisKind::Hackathon { category } => Some(category.clone()),
    };
    let payload = AnalysisPayload {
        feedback: analysis.feedback.clone(),
        suggestions: analysis.suggestions.clone(),
        category,
    };

    AnalysisRecord {
        id: analysis.id.into_uuid(),
        user_id: analysis.user_id.into_uuid(),
        kind: analysis.discriminator().to_string(),
        subject_text: analysis.subject_text.clone(),
        score: f64::from(analysis.score.value()),
        locale: analysis.locale.as_str().to_string(),
        payload: serde_json::to_value(&payload)
            .expect("analysis payload serialization is infallible"),
        created_at: analysis.created_at,
        updated_at: analysis.updated_at,
    }
}

/// Rebuild an analysis from its row shape.
///
/// The discriminator is read first; the payload must agree with it.
pub fn record_to_analysis(record: AnalysisRecord) -> Result<Analysis, MappingError> {
    let payload: AnalysisPayload =
        serde_json::from_value(record.payload).map_err(|source| MappingError::Malformed {
            id: record.id.to_string(),
            source,
        })?;

    let kind = match record.kind.as_str() {
        KIND_IDEA => {
            if payload.category.is_some() {
                return Err(MappingError::corrupt(
                    record.id,
                    "idea discriminator but payload carries a category",
                ));
            }
            AnalysisKind::Idea
        }
        KIND_HACKATHON => match payload.category {
            Some(category @ Category::Hackathon { .. }) => AnalysisKind::Hackathon { category },
            Some(Category::General { name }) => {
                return Err(MappingError::corrupt(
                    record.id,
                    format!("hackathon discriminator but category is general ({name:?})"),
                ));
            }
            None => {
                return Err(MappingError::corrupt(
                    record.id,
                    "hackathon discriminator but payload lacks a category",
                ));
            }
        },
        other => {
            return Err(MappingError::corrupt(
                record.id,
                format!("unknown analysis discriminator {other:?}"),
            ));
        }
    };

    let score = Score::from_raw(record.score)
        .map_err(|e| MappingError::invalid_stored(record.id, e))?;
    let locale = Locale::parse(&record.locale)
        .map_err(|e| MappingError::invalid_stored(record.id, e))?;

    Ok(Analysis {
        id: AnalysisId::from_uuid(record.id),
        user_id: UserId::from_uuid(record.user_id),
        subject_text: record.subject_text,
        score,
        locale,
        feedback: payload.feedback.filter(|f| !f.trim().is_empty()),
        suggestions: payload.suggestions,
        kind,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

/// Batch conversion, short-circuiting on the first failing record.
pub fn records_to_analyses(records: Vec<AnalysisRecord>) -> Result<Vec<Analysis>, MappingError> {
    records.into_iter().map(record_to_analysis).collect()
}

// ---------------------------------------------------------------------------
// Credit transaction
// ---------------------------------------------------------------------------

/// Flatten a ledger entry into its row shape.
pub fn transaction_to_record(tx: &CreditTransaction) -> CreditTransactionRecord {
    CreditTransactionRecord {
        id: tx.id.into_uuid(),
        user_id: tx.user_id.into_uuid(),
        amount: tx.amount,
        tx_type: tx.tx_type.as_str().to_string(),
        description: tx.description.clone(),
        metadata: serde_json::to_value(&tx.metadata)
            .expect("string map serialization is infallible"),
        timestamp: tx.timestamp,
        created_at: tx.created_at,
    }
}

/// Rebuild a ledger entry from its row shape.
///
/// The stored amount is re-checked against the type's sign rule: a ledger
/// row violating it is corrupt, not merely odd.
pub fn record_to_transaction(
    record: CreditTransactionRecord,
) -> Result<CreditTransaction, MappingError> {
    let tx_type = ideaforge_domain::credit::TransactionType::parse(&record.tx_type)
        .map_err(|e| MappingError::invalid_stored(record.id, e))?;
    tx_type
        .validate_amount(record.amount)
        .map_err(|e| MappingError::invalid_stored(record.id, e))?;
    let metadata: IndexMap<String, String> =
        serde_json::from_value(record.metadata).map_err(|source| MappingError::Malformed {
            id: record.id.to_string(),
            source,
        })?;

    Ok(CreditTransaction {
        id: TransactionId::from_uuid(record.id),
        user_id: UserId::from_uuid(record.user_id),
        amount: record.amount,
        tx_type,
        description: record.description,
        metadata,
        timestamp: record.timestamp,
        created_at: record.created_at,
    })
}

/// Batch conversion, short-circuiting on the first failing record.
pub fn records_to_transactions(
    records: Vec<CreditTransactionRecord>,
) -> Result<Vec<CreditTransaction>, MappingError> {
    records.into_iter().map(record_to_transaction).collect()
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Flatten a user into its row shape.
pub fn user_to_record(user: &User) -> UserRecord {
    UserRecord {
        id: user.id.into_uuid(),
        tier: user.tier.as_str().to_string(),
        preferences: serde_json::to_value(&user.preferences)
            .expect("preference serialization is infallible"),
        created_at: user.created_at,
    }
}

/// Rebuild a user from its row shape. Missing preference keys take their
/// defaults.
pub fn record_to_user(record: UserRecord) -> Result<User, MappingError> {
    let tier = UserTier::parse(&record.tier)
        .map_err(|e| MappingError::invalid_stored(record.id, e))?;
    let preferences: UserPreferences =
        serde_json::from_value(record.preferences).map_err(|source| MappingError::Malformed {
            id: record.id.to_string(),
            source,
        })?;

    Ok(User {
        id: UserId::from_uuid(record.id),
        tier,
        preferences,
        created_at: record.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ideaforge_domain::category::HackathonTrack;
    use serde_json::json;

    fn idea_analysis() -> Analysis {
        Analysis::new_idea(
            UserId::new(),
            "pocket sommelier app",
            Score::new(81).unwrap(),
            Locale::En,
            Some("niche but loyal market".into()),
            vec!["partner with wine clubs".into()],
        )
        .unwrap()
    }

    fn hackathon_analysis() -> Analysis {
        Analysis::new_hackathon(
            UserId::new(),
            "latency heatmap overlay",
            Score::new(67).unwrap(),
            Locale::Es,
            None,
            vec!["demo against a real cluster".into()],
            Category::hackathon(HackathonTrack::Ai),
        )
        .unwrap()
    }

    #[test]
    fn test_idea_roundtrip_is_lossless() {
        let mut idea = Idea::new(UserId::new(), "rent-a-robot lawn care", IdeaSource::Manual)
            .unwrap();
        idea.set_tags(vec!["hardware".into(), "subscriptions".into()]);
        idea.set_notes(Some("capex heavy".into()));

        let back = record_to_idea(idea_to_record(&idea)).unwrap();
        assert_eq!(back, idea);
    }

    #[test]
    fn test_document_roundtrip_is_lossless() {
        let doc = Document::new(
            IdeaId::new(),
            UserId::new(),
            DocumentType::TechnicalDesign,
            "TDD: robot fleet",
            json!({"components": ["scheduler", "telemetry"]}),
        );
        let back = record_to_document(document_to_record(&doc)).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_analysis_roundtrip_preserves_the_variant() {
        for analysis in [idea_analysis(), hackathon_analysis()] {
            let back = record_to_analysis(analysis_to_record(&analysis)).unwrap();
            assert_eq!(back, analysis);
        }
    }

    #[test]
    fn test_transaction_roundtrip_is_lossless() {
        let tx = CreditTransaction::deduct(UserId::new(), 5, "analysis", "act-9").unwrap();
        let back = record_to_transaction(transaction_to_record(&tx)).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn test_user_roundtrip_is_lossless() {
        let user = User::with_tier(UserId::new(), UserTier::Paid);
        let back = record_to_user(user_to_record(&user)).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn test_hackathon_discriminator_without_category_is_corrupt() {
        let mut record = analysis_to_record(&idea_analysis());
        record.kind = KIND_HACKATHON.to_string();

        let err = record_to_analysis(record).unwrap_err();
        assert!(matches!(err, MappingError::CorruptRecord { .. }));
    }

    #[test]
    fn test_idea_discriminator_with_category_is_corrupt() {
        let mut record = analysis_to_record(&hackathon_analysis());
        record.kind = KIND_IDEA.to_string();

        let err = record_to_analysis(record).unwrap_err();
        assert!(matches!(err, MappingError::CorruptRecord { .. }));
    }

    #[test]
    fn test_general_category_under_hackathon_discriminator_is_corrupt() {
        let mut record = analysis_to_record(&hackathon_analysis());
        record.payload["category"] = json!({"kind": "general", "name": "fintech"});

        let err = record_to_analysis(record).unwrap_err();
        assert!(matches!(err, MappingError::CorruptRecord { .. }));
    }

    #[test]
    fn test_unknown_discriminator_is_corrupt() {
        let mut record = analysis_to_record(&idea_analysis());
        record.kind = "pitch".to_string();

        let err = record_to_analysis(record).unwrap_err();
        assert!(matches!(err, MappingError::CorruptRecord { .. }));
    }

    #[test]
    fn test_legacy_five_scale_scores_normalize_on_read() {
        let mut record = analysis_to_record(&idea_analysis());
        record.score = 4.5;

        let analysis = record_to_analysis(record).unwrap();
        assert_eq!(analysis.score.value(), 90);
    }

    #[test]
    fn test_empty_feedback_sentinel_maps_to_absent() {
        let mut record = analysis_to_record(&idea_analysis());
        record.payload["feedback"] = json!("");

        let analysis = record_to_analysis(record).unwrap();
        assert!(analysis.feedback.is_none());
    }

    #[test]
    fn test_batch_reports_the_failing_record() {
        let good = analysis_to_record(&idea_analysis());
        let mut bad = analysis_to_record(&idea_analysis());
        bad.kind = "???".to_string();
        let bad_id = bad.id.to_string();

        let err = records_to_analyses(vec![good, bad]).unwrap_err();
        assert_eq!(err.record_id(), bad_id);
    }

    #[test]
    fn test_ledger_row_with_wrong_sign_is_corrupt() {
        let tx = CreditTransaction::add(UserId::new(), 10, "grant").unwrap();
        let mut record = transaction_to_record(&tx);
        record.amount = -10;

        assert!(record_to_transaction(record).is_err());
    }
}
