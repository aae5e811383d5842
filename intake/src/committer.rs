//! Submission committer.
//!
//! Writes a final submission in one transaction:
//!
//! ```text
//! BEGIN
//!   a. upsert visitor
//!   b. resolve contact (match on email or phone, else create)
//!   c. insert form_submissions row (SUBMITTED)
//!   d. insert one submission_answers row per answer
//!   e. advance visit session to SUBMITTED
//! COMMIT
//!   then, best-effort: count `submitted`, delete the draft
//! ```
//!
//! Any failure before `COMMIT` drops the transaction and nothing is written.

use crate::analytics::AnalyticsCounter;
use crate::drafts::DraftStore;
use crate::metrics::SUBMISSIONS_COMMITTED;
use crate::validation::ValidSubmission;
use chrono::Utc;
use eventform_core::keys::AnalyticsMetric;
use eventform_core::providers::{KeyValueCache, SubmissionStore, SubmissionTransaction};
use eventform_core::{
    ContactId, ContactInput, Event, Form, FormSubmission, IntakeError, Result, SubmissionId,
    SubmissionReceipt, SubmissionStatus,
};
use std::sync::Arc;

/// An active event together with its published form.
///
/// Only [`PublishedForm::new`] builds one, so holding it proves both
/// preconditions were checked.
#[derive(Debug, Clone)]
pub struct PublishedForm {
    event: Event,
    form: Form,
}

impl PublishedForm {
    /// Check an event/form pair.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::NotFound`] if the event is not
    /// active or the form is not published.
    pub fn new(event: Event, form: Form) -> Result<Self> {
        if !event.is_active() {
            return Err(IntakeError::not_found("Event not found"));
        }
        if !form.is_published() {
            return Err(IntakeError::not_found("Form not found"));
        }
        Ok(Self { event, form })
    }

    /// The event.
    #[must_use]
    pub const fn event(&self) -> &Event {
        &self.event
    }

    /// The form.
    #[must_use]
    pub const fn form(&self) -> &Form {
        &self.form
    }
}

/// Transactional submit.
pub struct SubmissionCommitter<C, S> {
    store: Arc<S>,
    analytics: AnalyticsCounter<C>,
    drafts: DraftStore<C>,
}

impl<C, S> Clone for SubmissionCommitter<C, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            analytics: self.analytics.clone(),
            drafts: self.drafts.clone(),
        }
    }
}

impl<C: KeyValueCache, S: SubmissionStore> SubmissionCommitter<C, S> {
    /// Create a committer.
    #[must_use]
    pub const fn new(store: Arc<S>, analytics: AnalyticsCounter<C>, drafts: DraftStore<C>) -> Self {
        Self {
            store,
            analytics,
            drafts,
        }
    }

    /// Commit a validated submission against a published form.
    ///
    /// # Errors
    ///
    /// Returns error if any transactional write or the commit fails. In that
    /// case no visitor, contact, submission, answer or session change is
    /// persisted.
    pub async fn submit(
        &self,
        target: &PublishedForm,
        submission: ValidSubmission,
    ) -> Result<SubmissionReceipt> {
        let event_id = target.event.id;
        let form_id = target.form.id;

        let mut tx = self.store.begin().await?;

        let visitor = tx.upsert_visitor(&submission.visitor).await?;

        let contact_id = match &submission.contact {
            Some(contact) => resolve_contact(&mut tx, contact).await?,
            None => None,
        };

        let record = FormSubmission {
            id: SubmissionId::new(),
            form_id,
            event_id,
            visitor_id: visitor.id,
            contact_id,
            status: SubmissionStatus::Submitted,
            submitted_at: Utc::now(),
            is_deleted: false,
        };
        tx.insert_submission(&record).await?;
        tx.insert_answers(record.id, &submission.answers).await?;
        tx.advance_session(visitor.id, event_id, SubmissionStatus::Submitted)
            .await?;

        tx.commit().await?;

        metrics::counter!(SUBMISSIONS_COMMITTED).increment(1);
        tracing::info!(
            submission_id = %record.id,
            event_id = %event_id,
            form_id = %form_id,
            visitor_id = %visitor.id,
            answers = submission.answers.len(),
            "Submission committed"
        );

        self.analytics
            .record_once(event_id, visitor.id, AnalyticsMetric::Submitted)
            .await;
        self.drafts.discard(form_id, visitor.id).await;

        Ok(SubmissionReceipt::from(&record))
    }
}

/// Reuse a contact matching on email or phone, else create one.
///
/// A matched contact has the supplied fields written over it. Without an
/// email or phone there is nothing to match on and no contact is recorded.
async fn resolve_contact<T: SubmissionTransaction>(
    tx: &mut T,
    input: &ContactInput,
) -> Result<Option<ContactId>> {
    if !input.has_lookup_key() {
        return Ok(None);
    }

    let existing = tx
        .find_contact_by_email_or_phone(input.email.as_deref(), input.phone.as_deref())
        .await?;

    let contact_id = match existing {
        Some(existing) => {
            let merged = existing.clone().merged_with(input);
            if merged != existing {
                tx.update_contact(&merged).await?;
            }
            existing.id
        }
        None => tx.create_contact(input).await?.id,
    };

    Ok(Some(contact_id))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use eventform_core::{AnswerValue, EventStatus, FieldId, SubmissionAnswer, VisitorIdentity};
    use eventform_testing::{MockCache, MockStore, fixtures};
    use std::time::Duration;
    use uuid::Uuid;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    struct Harness {
        cache: Arc<MockCache>,
        store: Arc<MockStore>,
        committer: SubmissionCommitter<MockCache, MockStore>,
        target: PublishedForm,
    }

    fn harness() -> Harness {
        let cache = Arc::new(MockCache::new());
        let store = Arc::new(MockStore::new());
        let (event, form) = fixtures::published_form("spring-gala");
        let committer = SubmissionCommitter::new(
            Arc::clone(&store),
            AnalyticsCounter::new(Arc::clone(&cache), DAY),
            DraftStore::new(Arc::clone(&cache), DAY),
        );

        Harness {
            cache,
            store,
            committer,
            target: PublishedForm::new(event, form).unwrap(),
        }
    }

    fn submission(contact: Option<ContactInput>) -> ValidSubmission {
        ValidSubmission {
            visitor: VisitorIdentity::anonymous(Uuid::new_v4()),
            contact,
            answers: vec![SubmissionAnswer {
                field_id: FieldId::new(),
                field_key: "name".into(),
                value: AnswerValue::Text("Ada".into()),
            }],
        }
    }

    fn email_contact(email: &str, name: Option<&str>) -> ContactInput {
        ContactInput {
            name: name.map(str::to_string),
            email: Some(email.into()),
            phone: None,
        }
    }

    #[test]
    fn inactive_event_or_unpublished_form_is_rejected() {
        let (mut event, form) = fixtures::published_form("draft-event");
        event.status = EventStatus::Draft;
        assert!(PublishedForm::new(event, form).is_err());

        let (event, mut form) = fixtures::published_form("unpublished");
        form.published_at = None;
        assert!(PublishedForm::new(event, form).is_err());
    }

    #[tokio::test]
    async fn commit_writes_everything() {
        let h = harness();
        let receipt = h
            .committer
            .submit(&h.target, submission(Some(email_contact("ada@example.com", None))))
            .await
            .unwrap();

        assert_eq!(receipt.status, SubmissionStatus::Submitted);
        assert_eq!(h.store.submission_count(), 1);
        assert_eq!(h.store.answer_count(), 1);
        assert_eq!(h.store.contact_count(), 1);
        assert_eq!(h.store.session_statuses(), vec![SubmissionStatus::Submitted]);
    }

    #[tokio::test]
    async fn contacts_are_deduplicated_by_email() {
        let h = harness();

        let first = h
            .committer
            .submit(&h.target, submission(Some(email_contact("ada@example.com", None))))
            .await
            .unwrap();
        let second = h
            .committer
            .submit(
                &h.target,
                submission(Some(email_contact("ada@example.com", Some("Ada Lovelace")))),
            )
            .await
            .unwrap();

        assert_eq!(h.store.contact_count(), 1);
        let first = h.store.submission(first.submission_id).unwrap();
        let second = h.store.submission(second.submission_id).unwrap();
        assert_eq!(first.contact_id, second.contact_id);

        let contact = h.store.contact(first.contact_id.unwrap()).unwrap();
        assert_eq!(contact.name.as_deref(), Some("Ada Lovelace"));

        let third = h
            .committer
            .submit(&h.target, submission(Some(email_contact("grace@example.com", None))))
            .await
            .unwrap();

        assert_eq!(h.store.contact_count(), 2);
        let third = h.store.submission(third.submission_id).unwrap();
        assert_ne!(third.contact_id, first.contact_id);
    }

    #[tokio::test]
    async fn contacts_are_matched_by_phone() {
        let h = harness();
        let phone_contact = |email: Option<&str>| ContactInput {
            name: Some("Ada".into()),
            email: email.map(str::to_string),
            phone: Some("+44 20 7946 0000".into()),
        };

        let first = h
            .committer
            .submit(&h.target, submission(Some(phone_contact(None))))
            .await
            .unwrap();
        let second = h
            .committer
            .submit(&h.target, submission(Some(phone_contact(Some("ada@example.com")))))
            .await
            .unwrap();

        assert_eq!(h.store.contact_count(), 1);
        let first = h.store.submission(first.submission_id).unwrap();
        let second = h.store.submission(second.submission_id).unwrap();
        assert_eq!(first.contact_id, second.contact_id);

        let contact = h.store.contact(first.contact_id.unwrap()).unwrap();
        assert_eq!(contact.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn name_without_email_or_phone_records_no_contact() {
        let h = harness();
        let name_only = ContactInput {
            name: Some("Ada".into()),
            email: None,
            phone: None,
        };

        let receipt = h
            .committer
            .submit(&h.target, submission(Some(name_only)))
            .await
            .unwrap();

        assert_eq!(h.store.contact_count(), 0);
        let stored = h.store.submission(receipt.submission_id).unwrap();
        assert_eq!(stored.contact_id, None);
    }

    #[tokio::test]
    async fn failed_answer_insert_rolls_back_everything() {
        let h = harness();
        h.store.fail_answer_inserts(true);

        let result = h
            .committer
            .submit(&h.target, submission(Some(email_contact("ada@example.com", None))))
            .await;

        assert!(result.is_err());
        assert_eq!(h.store.submission_count(), 0);
        assert_eq!(h.store.answer_count(), 0);
        assert_eq!(h.store.contact_count(), 0);
        assert_eq!(h.store.visitor_count(), 0);
        assert!(h.store.session_statuses().is_empty());
    }

    #[tokio::test]
    async fn cache_outage_does_not_fail_commit() {
        let h = harness();
        h.cache.set_failing(true);

        let result = h.committer.submit(&h.target, submission(None)).await;

        assert!(result.is_ok());
        assert_eq!(h.store.submission_count(), 1);
    }
}
