//! Analysis use cases.
//!
//! The external scorer is out of scope; this service consumes only its
//! output shape ([`AnalysisOutcome`]) and wraps it into domain entities,
//! normalizing the raw score through the single rescaling rule.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use ideaforge_common::pagination::{Page, PageRequest};
use ideaforge_domain::analysis::Analysis;
use ideaforge_domain::category::{Category, HackathonTrack};
use ideaforge_domain::events::DomainEvent;
use ideaforge_domain::identifiers::AnalysisId;
use ideaforge_domain::locale::Locale;
use ideaforge_domain::score::Score;
use ideaforge_infrastructure::repositories::{AnalysisCommands, AnalysisQueries, AnalysisQuery};
use serde::Deserialize;

use super::{EventPublisher, ServiceContext};
use crate::{ApplicationError, ApplicationResult};

/// The external analysis service's output shape.
///
/// `score` arrives on whatever scale the scorer used (0-5 legacy or
/// 0-100); `category` is a free-form domain label for ideas and a
/// competition-track code for hackathon projects.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisOutcome {
    /// Raw score; normalized via the single rescaling rule
    pub score: f64,
    /// Narrative feedback, possibly absent
    #[serde(default)]
    pub feedback: Option<String>,
    /// Improvement suggestions
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Category label, when the scorer assigned one
    #[serde(default)]
    pub category: Option<String>,
}

/// Use cases for recorded analyses.
pub struct AnalysisService<A, E>
where
    A: AnalysisCommands + AnalysisQueries,
    E: EventPublisher,
{
    repository: Arc<A>,
    events: Arc<E>,
}

impl<A, E> AnalysisService<A, E>
where
    A: AnalysisCommands + AnalysisQueries,
    E: EventPublisher,
{
    /// Wire a service to its collaborators.
    pub fn new(repository: Arc<A>, events: Arc<E>) -> Self {
        Self { repository, events }
    }

    /// Record the scorer's verdict on a startup idea.
    #[instrument(skip(self, ctx, subject_text, outcome), fields(request_id = %ctx.request_id))]
    pub async fn record_idea_analysis(
        &self,
        ctx: &ServiceContext,
        subject_text: impl Into<String>,
        locale: Locale,
        outcome: AnalysisOutcome,
    ) -> ApplicationResult<Analysis> {
        if let Some(label) = &outcome.category {
            // advisory general label; validated, then dropped (the idea
            // variant persists no category)
            Category::general(label.clone())?;
            debug!(category = %label, "Dropping advisory category on idea analysis");
        }

        let analysis = Analysis::new_idea(
            ctx.user_id,
            subject_text,
            Score::from_raw(outcome.score)?,
            locale,
            outcome.feedback,
            outcome.suggestions,
        )?;
        self.repository.record(&analysis).await?;

        self.publish_recorded_event(&analysis);
        info!(analysis_id = %analysis.id, score = analysis.score.value(), "Idea analysis recorded");
        Ok(analysis)
    }

    /// Record the scorer's verdict on a hackathon project.
    ///
    /// The outcome must name a competition track; a missing or unknown
    /// track is invalid input, never silently defaulted.
    #[instrument(skip(self, ctx, subject_text, outcome), fields(request_id = %ctx.request_id))]
    pub async fn record_hackathon_analysis(
        &self,
        ctx: &ServiceContext,
        subject_text: impl Into<String>,
        locale: Locale,
        outcome: AnalysisOutcome,
    ) -> ApplicationResult<Analysis> {
        let track_code = outcome.category.as_deref().ok_or_else(|| {
            ApplicationError::InvalidInput(
                "hackathon analyses require a competition track".to_string(),
            )
        })?;
        let track = HackathonTrack::parse(track_code)?;

        let analysis = Analysis::new_hackathon(
            ctx.user_id,
            subject_text,
            Score::from_raw(outcome.score)?,
            locale,
            outcome.feedback,
            outcome.suggestions,
            Category::hackathon(track),
        )?;
        self.repository.record(&analysis).await?;

        self.publish_recorded_event(&analysis);
        info!(
            analysis_id = %analysis.id,
            track = track.as_str(),
            "Hackathon analysis recorded"
        );
        Ok(analysis)
    }

    /// Re-score an existing analysis with a fresh outcome.
    ///
    /// A full replacement of score/feedback/suggestions; the variant and
    /// subject text never change.
    #[instrument(skip(self, ctx, outcome), fields(request_id = %ctx.request_id))]
    pub async fn rescore(
        &self,
        ctx: &ServiceContext,
        id: AnalysisId,
        outcome: AnalysisOutcome,
    ) -> ApplicationResult<Analysis> {
        let mut analysis = self.repository.find_by_id(id, Some(ctx.user_id)).await?;
        analysis.rescore(
            Score::from_raw(outcome.score)?,
            outcome.feedback,
            outcome.suggestions,
        );
        self.repository.rescore(&analysis, ctx.user_id).await?;
        info!(analysis_id = %id, score = analysis.score.value(), "Analysis re-scored");
        Ok(analysis)
    }

    /// Fetch one of the acting user's analyses.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn get(&self, ctx: &ServiceContext, id: AnalysisId) -> ApplicationResult<Analysis> {
        Ok(self.repository.find_by_id(id, Some(ctx.user_id)).await?)
    }

    /// Page through the acting user's analyses.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn list(
        &self,
        ctx: &ServiceContext,
        page: PageRequest,
    ) -> ApplicationResult<Page<Analysis>> {
        Ok(self.repository.list_by_user(ctx.user_id, page).await?)
    }

    /// Search the acting user's analyses.
    #[instrument(skip(self, ctx, query), fields(request_id = %ctx.request_id))]
    pub async fn search(
        &self,
        ctx: &ServiceContext,
        query: AnalysisQuery,
    ) -> ApplicationResult<Page<Analysis>> {
        Ok(self.repository.search(ctx.user_id, query).await?)
    }

    fn publish_recorded_event(&self, analysis: &Analysis) {
        self.events.publish(DomainEvent::AnalysisRecorded {
            analysis_id: analysis.id,
            user_id: analysis.user_id,
            kind: analysis.discriminator().to_string(),
        });
    }
}
