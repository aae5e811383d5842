//! Intake service.
//!
//! Entry point for every inbound action. Resolves the event and form behind
//! a slug, enforces preconditions, then hands off to the components.

use crate::analytics::AnalyticsCounter;
use crate::committer::{PublishedForm, SubmissionCommitter};
use crate::config::IntakeConfig;
use crate::drafts::DraftStore;
use crate::public_form::PublicFormCache;
use crate::session::SessionTracker;
use crate::validation::SubmissionInput;
use chrono::{DateTime, Utc};
use eventform_core::keys::AnalyticsMetric;
use eventform_core::providers::{DurableStore, KeyValueCache, Readiness};
use eventform_core::{
    Draft, Event, EventAnalytics, EventId, IntakeError, PublicForm, Result, SubmissionDetail,
    SubmissionId, SubmissionPage, SubmissionQuery, SubmissionReceipt, SubmissionStatus,
    VisitSession, VisitorIdentity,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Outcome of a draft save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftReceipt {
    /// Whether the cache accepted the draft.
    pub saved: bool,
    /// Timestamp stored with the draft.
    pub updated_at: DateTime<Utc>,
}

/// The visitor-session and submission pipeline.
pub struct IntakeService<C, S> {
    store: Arc<S>,
    cache: Arc<C>,
    sessions: SessionTracker<S>,
    analytics: AnalyticsCounter<C>,
    drafts: DraftStore<C>,
    committer: SubmissionCommitter<C, S>,
    public_forms: PublicFormCache<C, S>,
}

impl<C, S> IntakeService<C, S>
where
    C: KeyValueCache + Readiness,
    S: DurableStore,
{
    /// Wire the pipeline over its two collaborators.
    #[must_use]
    pub fn new(cache: Arc<C>, store: Arc<S>, config: IntakeConfig) -> Self {
        let analytics = AnalyticsCounter::new(Arc::clone(&cache), config.analytics_dedup_ttl);
        let drafts = DraftStore::new(Arc::clone(&cache), config.draft_ttl);

        Self {
            sessions: SessionTracker::new(Arc::clone(&store)),
            committer: SubmissionCommitter::new(
                Arc::clone(&store),
                analytics.clone(),
                drafts.clone(),
            ),
            public_forms: PublicFormCache::new(
                Arc::clone(&cache),
                Arc::clone(&store),
                config.public_form_ttl,
            ),
            analytics,
            drafts,
            store,
            cache,
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Visitor actions
    // ═══════════════════════════════════════════════════════════

    /// Public projection of the form behind `slug`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event is not active or the form is not published.
    pub async fn public_form(&self, slug: &str) -> Result<PublicForm> {
        self.public_forms.get_public_form(slug).await
    }

    /// Record that a visitor opened the form.
    ///
    /// Only the event has to be active; the form is not consulted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event is missing or not active, or a store error.
    pub async fn record_visit(
        &self,
        slug: &str,
        identity: &VisitorIdentity,
    ) -> Result<VisitSession> {
        let event = self.active_event(slug).await?;
        let session = self
            .sessions
            .record_progress(identity, event.id, SubmissionStatus::Visited)
            .await?;

        self.analytics
            .record_once(event.id, session.visitor_id, AnalyticsMetric::Visits)
            .await;

        Ok(session)
    }

    /// Record that a visitor started filling the form.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event is not active or the form is not
    /// published, or a store error.
    pub async fn start_submission(
        &self,
        slug: &str,
        identity: &VisitorIdentity,
    ) -> Result<VisitSession> {
        let target = self.published_form(slug).await?;
        let event_id = target.event().id;
        let session = self
            .sessions
            .record_progress(identity, event_id, SubmissionStatus::Started)
            .await?;

        self.analytics
            .record_once(event_id, session.visitor_id, AnalyticsMetric::Started)
            .await;

        Ok(session)
    }

    /// Commit a final submission.
    ///
    /// # Errors
    ///
    /// Returns, in this order of checking:
    /// - `NotFound` if the event is not active
    /// - `NotFound` if the form is not published
    /// - `BadRequest` if answers or contact fail validation
    /// - a store error if the transaction fails, with nothing persisted
    pub async fn submit(&self, slug: &str, input: SubmissionInput) -> Result<SubmissionReceipt> {
        let target = self.published_form(slug).await?;
        let submission = input.validate()?;
        self.committer.submit(&target, submission).await
    }

    /// Save a draft for this visitor.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event is not active or the form is not
    /// published, or a store error from the visitor upsert. A cache failure
    /// is reported as `saved: false`, not as an error.
    pub async fn save_draft(
        &self,
        slug: &str,
        identity: &VisitorIdentity,
        answers: Value,
        contact: Option<Value>,
    ) -> Result<DraftReceipt> {
        let target = self.published_form(slug).await?;
        let visitor = self.store.upsert_visitor(identity).await?;

        let draft = Draft {
            answers,
            contact,
            updated_at: Utc::now(),
        };
        let saved = self
            .drafts
            .save_draft(target.form().id, visitor.id, &draft)
            .await?;

        Ok(DraftReceipt {
            saved,
            updated_at: draft.updated_at,
        })
    }

    /// Current draft for this visitor, if any.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event is not active or the form is not
    /// published, or a store error from the visitor upsert.
    pub async fn get_draft(&self, slug: &str, identity: &VisitorIdentity) -> Result<Option<Draft>> {
        let target = self.published_form(slug).await?;
        let visitor = self.store.upsert_visitor(identity).await?;
        Ok(self.drafts.get_draft(target.form().id, visitor.id).await)
    }

    // ═══════════════════════════════════════════════════════════
    // Organizer reads
    // ═══════════════════════════════════════════════════════════

    /// One submission with its contact and answers.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent or soft-deleted.
    pub async fn submission(&self, submission_id: SubmissionId) -> Result<SubmissionDetail> {
        self.store
            .find_submission(submission_id)
            .await?
            .ok_or_else(|| IntakeError::not_found("Submission not found"))
    }

    /// A page of an event's submissions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event does not exist, or a store error.
    pub async fn submissions_for_event(
        &self,
        event_id: EventId,
        query: &SubmissionQuery,
    ) -> Result<SubmissionPage> {
        self.existing_event(event_id).await?;
        let items = self.store.list_submissions(event_id, query).await?;
        Ok(SubmissionPage::from(items))
    }

    /// Soft-delete a submission.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent or already deleted.
    pub async fn delete_submission(&self, submission_id: SubmissionId) -> Result<()> {
        if !self.store.soft_delete_submission(submission_id).await? {
            return Err(IntakeError::not_found("Submission not found"));
        }
        tracing::info!(submission_id = %submission_id, "Submission soft-deleted");
        Ok(())
    }

    /// Funnel counters for an event.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event does not exist, or a cache error.
    pub async fn event_analytics(&self, event_id: EventId) -> Result<EventAnalytics> {
        self.existing_event(event_id).await?;
        self.analytics.snapshot(event_id).await
    }

    /// Drop the cached public projection for `slug`.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable.
    pub async fn invalidate_public_form(&self, slug: &str) -> Result<()> {
        self.public_forms.invalidate(slug).await
    }

    // ═══════════════════════════════════════════════════════════
    // Resolution
    // ═══════════════════════════════════════════════════════════

    async fn active_event(&self, slug: &str) -> Result<Event> {
        self.store
            .find_event_by_slug(slug)
            .await?
            .filter(Event::is_active)
            .ok_or_else(|| IntakeError::not_found("Event not found"))
    }

    async fn published_form(&self, slug: &str) -> Result<PublishedForm> {
        let event = self.active_event(slug).await?;
        let form = self
            .store
            .find_form_by_event_id(event.id)
            .await?
            .ok_or_else(|| IntakeError::not_found("Form not found"))?;
        PublishedForm::new(event, form)
    }

    async fn existing_event(&self, event_id: EventId) -> Result<Event> {
        self.store
            .find_event_by_id(event_id)
            .await?
            .ok_or_else(|| IntakeError::not_found("Event not found"))
    }
}

impl<C, S> Readiness for IntakeService<C, S>
where
    C: KeyValueCache + Readiness,
    S: DurableStore,
{
    /// Ready when both the durable store and the cache answer.
    async fn check_ready(&self) -> Result<()> {
        self.store.check_ready().await?;
        self.cache.check_ready().await
    }
}
