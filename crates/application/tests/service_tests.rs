//! Service-level tests over the in-memory repositories.

use std::sync::Arc;

use ideaforge_application::services::{
    AnalysisOutcome, AnalysisService, CreditService, DocumentService, EventPublisher,
    IdeaService, ServiceConfig, ServiceContext,
};
use ideaforge_application::validation::{CreateIdeaRequest, GenerateDocumentRequest};
use ideaforge_application::ApplicationError;
use ideaforge_domain::document::DocumentType;
use ideaforge_domain::events::DomainEvent;
use ideaforge_domain::idea::IdeaSource;
use ideaforge_domain::identifiers::UserId;
use ideaforge_domain::locale::Locale;
use ideaforge_domain::version::DocumentVersion;
use ideaforge_infrastructure::memory::{
    MemoryAnalysisRepository, MemoryCreditRepository, MemoryDocumentRepository,
    MemoryIdeaRepository, MemoryStore,
};
use ideaforge_testing::mocks::MockEventPublisher;
use serde_json::json;

/// Adapts the recording mock to the application's publisher port.
struct RecordingPublisher(MockEventPublisher);

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: DomainEvent) {
        self.0.publish(event);
    }
}

struct Harness {
    ctx: ServiceContext,
    ideas: Arc<MemoryIdeaRepository>,
    documents: Arc<MemoryDocumentRepository>,
    analyses: Arc<MemoryAnalysisRepository>,
    ledger: Arc<MemoryCreditRepository>,
    events: Arc<RecordingPublisher>,
}

impl Harness {
    fn new() -> Self {
        let store = MemoryStore::new();
        Self {
            ctx: ServiceContext::new(UserId::new()),
            ideas: Arc::new(MemoryIdeaRepository::new(store.clone())),
            documents: Arc::new(MemoryDocumentRepository::new(store.clone())),
            analyses: Arc::new(MemoryAnalysisRepository::new(store.clone())),
            ledger: Arc::new(MemoryCreditRepository::new(store)),
            events: Arc::new(RecordingPublisher(MockEventPublisher::new())),
        }
    }

    fn idea_service(
        &self,
    ) -> IdeaService<MemoryIdeaRepository, MemoryDocumentRepository, RecordingPublisher> {
        IdeaService::new(self.ideas.clone(), self.documents.clone(), self.events.clone())
    }

    fn document_service(
        &self,
    ) -> DocumentService<MemoryDocumentRepository, MemoryIdeaRepository, RecordingPublisher> {
        DocumentService::new(self.documents.clone(), self.ideas.clone(), self.events.clone())
    }

    fn analysis_service(&self) -> AnalysisService<MemoryAnalysisRepository, RecordingPublisher> {
        AnalysisService::new(self.analyses.clone(), self.events.clone())
    }

    fn credit_service(&self) -> CreditService<MemoryCreditRepository, RecordingPublisher> {
        CreditService::new(
            self.ledger.clone(),
            self.events.clone(),
            ServiceConfig::default(),
        )
    }
}

fn create_request(text: &str) -> CreateIdeaRequest {
    CreateIdeaRequest {
        text: text.to_string(),
        source: IdeaSource::Manual,
        tags: vec![],
    }
}

// ---------------------------------------------------------------------------
// Idea + document flows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn idea_lifecycle_publishes_events_and_cascades() {
    let h = Harness::new();
    let ideas = h.idea_service();
    let documents = h.document_service();

    let idea = ideas
        .create(&h.ctx, create_request("a vertical farm in every supermarket"))
        .await
        .unwrap();

    documents
        .generate(
            &h.ctx,
            idea.id,
            GenerateDocumentRequest {
                document_type: DocumentType::Prd,
                title: "PRD".into(),
                content: json!({"a": 1}),
            },
        )
        .await
        .unwrap();

    assert!(ideas.delete(&h.ctx, idea.id).await.unwrap());
    // idempotent second delete
    assert!(!ideas.delete(&h.ctx, idea.id).await.unwrap());

    let types = h.events.0.event_types();
    assert_eq!(
        types,
        vec!["idea_created", "document_version_created", "idea_deleted"]
    );
    let deleted = h.events.0.published_events().into_iter().last().unwrap();
    match deleted {
        DomainEvent::IdeaDeleted {
            documents_removed, ..
        } => assert_eq!(documents_removed, 1),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn document_edit_and_restore_append_versions() {
    let h = Harness::new();
    let ideas = h.idea_service();
    let documents = h.document_service();

    let idea = ideas
        .create(&h.ctx, create_request("resume screening copilot"))
        .await
        .unwrap();

    documents
        .generate(
            &h.ctx,
            idea.id,
            GenerateDocumentRequest {
                document_type: DocumentType::Roadmap,
                title: "Roadmap".into(),
                content: json!({"a": 1}),
            },
        )
        .await
        .unwrap();

    let v2 = documents
        .edit(&h.ctx, idea.id, DocumentType::Roadmap, None, Some(json!({"a": 2})))
        .await
        .unwrap();
    assert_eq!(v2.version.value(), 2);

    let restored = documents
        .restore(&h.ctx, idea.id, DocumentType::Roadmap, DocumentVersion::FIRST)
        .await
        .unwrap();
    assert_eq!(restored.version.value(), 3);
    assert_eq!(restored.content, json!({"a": 1}));

    let history = documents
        .history(&h.ctx, idea.id, DocumentType::Roadmap)
        .await
        .unwrap();
    let versions: Vec<u32> = history.iter().map(|d| d.version.value()).collect();
    assert_eq!(versions, vec![3, 2, 1]);

    let latest = documents
        .latest(&h.ctx, idea.id, DocumentType::Roadmap)
        .await
        .unwrap();
    assert_eq!(latest.id, restored.id);
}

#[tokio::test]
async fn generating_documents_for_foreign_ideas_is_not_found() {
    let h = Harness::new();
    let ideas = h.idea_service();
    let documents = h.document_service();

    let idea = ideas
        .create(&h.ctx, create_request("group gifting wallet"))
        .await
        .unwrap();

    let stranger = ServiceContext::new(UserId::new());
    let err = documents
        .generate(
            &stranger,
            idea.id,
            GenerateDocumentRequest {
                document_type: DocumentType::Prd,
                title: "PRD".into(),
                content: json!({}),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// Analysis flows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn legacy_scale_scores_normalize_when_recorded() {
    let h = Harness::new();
    let analyses = h.analysis_service();

    let analysis = analyses
        .record_idea_analysis(
            &h.ctx,
            "an llm that writes grant applications",
            Locale::En,
            AnalysisOutcome {
                score: 4.2,
                feedback: Some("crowded space".into()),
                suggestions: vec!["focus on academia".into()],
                category: Some("ai".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(analysis.score.value(), 84);
    assert_eq!(analysis.discriminator(), "idea");
}

#[tokio::test]
async fn hackathon_analyses_require_a_known_track() {
    let h = Harness::new();
    let analyses = h.analysis_service();

    let err = analyses
        .record_hackathon_analysis(
            &h.ctx,
            "p2p disaster mesh",
            Locale::En,
            AnalysisOutcome {
                score: 88.0,
                feedback: None,
                suggestions: vec![],
                category: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::InvalidInput(_)));

    let err = analyses
        .record_hackathon_analysis(
            &h.ctx,
            "p2p disaster mesh",
            Locale::En,
            AnalysisOutcome {
                score: 88.0,
                feedback: None,
                suggestions: vec![],
                category: Some("underwater".into()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::InvalidInput(_)));

    let analysis = analyses
        .record_hackathon_analysis(
            &h.ctx,
            "p2p disaster mesh",
            Locale::En,
            AnalysisOutcome {
                score: 88.0,
                feedback: None,
                suggestions: vec![],
                category: Some("social".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(analysis.discriminator(), "hackathon");
}

#[tokio::test]
async fn rescore_replaces_the_verdict_wholesale() {
    let h = Harness::new();
    let analyses = h.analysis_service();

    let original = analyses
        .record_idea_analysis(
            &h.ctx,
            "self-hosted password inheritance",
            Locale::Es,
            AnalysisOutcome {
                score: 51.0,
                feedback: Some("unclear trust story".into()),
                suggestions: vec![],
                category: None,
            },
        )
        .await
        .unwrap();

    let updated = analyses
        .rescore(
            &h.ctx,
            original.id,
            AnalysisOutcome {
                score: 75.0,
                feedback: None,
                suggestions: vec!["partner with notaries".into()],
                category: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.score.value(), 75);
    assert!(updated.feedback.is_none());
    assert_eq!(updated.subject_text, original.subject_text);

    let fetched = analyses.get(&h.ctx, original.id).await.unwrap();
    assert_eq!(fetched.score.value(), 75);
}

// ---------------------------------------------------------------------------
// Credit flows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deduct_refund_flow_is_idempotent() {
    let h = Harness::new();
    let credits = h.credit_service();

    credits.grant(&h.ctx, h.ctx.user_id, 10, "starter pack").await.unwrap();

    credits
        .deduct_for_action(&h.ctx, 5, "idea analysis", "act-42")
        .await
        .unwrap();
    assert_eq!(credits.balance(&h.ctx).await.unwrap(), 5);

    // the paid action failed; refund it
    let refund = credits.refund_failed_action(&h.ctx, "act-42").await.unwrap();
    assert!(refund.is_some());
    assert_eq!(credits.balance(&h.ctx).await.unwrap(), 10);

    // an at-least-once retry must not double-refund
    let second = credits.refund_failed_action(&h.ctx, "act-42").await.unwrap();
    assert!(second.is_none());
    assert_eq!(credits.balance(&h.ctx).await.unwrap(), 10);

    let report = credits.reconcile(&h.ctx).await.unwrap();
    assert_eq!(report.refunded_actions, vec!["act-42".to_string()]);
    assert!(!report.has_anomalies());
}

#[tokio::test]
async fn deduction_requires_sufficient_balance() {
    let h = Harness::new();
    let credits = h.credit_service();

    credits.grant(&h.ctx, h.ctx.user_id, 3, "trial credits").await.unwrap();

    let err = credits
        .deduct_for_action(&h.ctx, 5, "idea analysis", "act-1")
        .await
        .unwrap_err();
    match err {
        ApplicationError::InsufficientCredits {
            required,
            available,
        } => {
            assert_eq!(required, 5);
            assert_eq!(available, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // balance untouched by the rejected deduction
    assert_eq!(credits.balance(&h.ctx).await.unwrap(), 3);
}

#[tokio::test]
async fn configured_prices_apply_to_convenience_deductions() {
    let h = Harness::new();
    let credits = h.credit_service();

    credits.grant(&h.ctx, h.ctx.user_id, 20, "starter pack").await.unwrap();

    // defaults: analysis 5, document 3
    let analysis = credits.deduct_for_analysis(&h.ctx, "an-1").await.unwrap();
    assert_eq!(analysis.amount, -5);
    let document = credits.deduct_for_document(&h.ctx, "doc-1").await.unwrap();
    assert_eq!(document.amount, -3);

    assert_eq!(credits.balance(&h.ctx).await.unwrap(), 12);
}

#[tokio::test]
async fn refunding_an_unknown_action_is_not_found() {
    let h = Harness::new();
    let credits = h.credit_service();

    let err = credits
        .refund_failed_action(&h.ctx, "never-happened")
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::NotFound(_)));
}
