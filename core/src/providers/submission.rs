//! Submission store traits.

use crate::error::Result;
use crate::ids::{EventId, SubmissionId, VisitorId};
use crate::model::{
    Contact, ContactInput, FormSubmission, SubmissionAnswer, SubmissionDetail, SubmissionQuery,
    SubmissionStatus, VisitSession, Visitor, VisitorIdentity,
};

/// Submission persistence.
pub trait SubmissionStore: Send + Sync {
    /// Unit of work for one submit.
    type Transaction: SubmissionTransaction;

    /// Open a transaction.
    ///
    /// # Errors
    ///
    /// Returns error if no connection is available.
    fn begin(&self) -> impl std::future::Future<Output = Result<Self::Transaction>> + Send;

    /// Load a submission with its contact and answers.
    ///
    /// Soft-deleted submissions are reported as absent.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn find_submission(
        &self,
        submission_id: SubmissionId,
    ) -> impl std::future::Future<Output = Result<Option<SubmissionDetail>>> + Send;

    /// List an event's submissions, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list_submissions(
        &self,
        event_id: EventId,
        query: &SubmissionQuery,
    ) -> impl std::future::Future<Output = Result<Vec<SubmissionDetail>>> + Send;

    /// Set the soft-delete flag.
    ///
    /// # Returns
    ///
    /// `false` if no live submission had that id.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn soft_delete_submission(
        &self,
        submission_id: SubmissionId,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}

/// Writes that make up one submit.
///
/// Nothing is visible to other readers until [`commit`](Self::commit).
/// Dropping the transaction without committing rolls everything back.
pub trait SubmissionTransaction: Send {
    /// Same contract as [`VisitorStore::upsert_visitor`](super::VisitorStore::upsert_visitor).
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn upsert_visitor(
        &mut self,
        identity: &VisitorIdentity,
    ) -> impl std::future::Future<Output = Result<Visitor>> + Send;

    /// Find a contact whose email or phone matches.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn find_contact_by_email_or_phone(
        &mut self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Option<Contact>>> + Send;

    /// Create a contact from the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn create_contact(
        &mut self,
        input: &ContactInput,
    ) -> impl std::future::Future<Output = Result<Contact>> + Send;

    /// Overwrite a contact's name, email and phone.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn update_contact(
        &mut self,
        contact: &Contact,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Insert the submission row.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn insert_submission(
        &mut self,
        submission: &FormSubmission,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Insert one answer row per answer.
    ///
    /// # Errors
    ///
    /// Returns error if any write fails.
    fn insert_answers(
        &mut self,
        submission_id: SubmissionId,
        answers: &[SubmissionAnswer],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Same contract as [`VisitorStore::advance_session`](super::VisitorStore::advance_session).
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn advance_session(
        &mut self,
        visitor_id: VisitorId,
        event_id: EventId,
        target: SubmissionStatus,
    ) -> impl std::future::Future<Output = Result<VisitSession>> + Send;

    /// Make every write visible atomically.
    ///
    /// # Errors
    ///
    /// Returns error if the commit fails, in which case nothing was written.
    fn commit(self) -> impl std::future::Future<Output = Result<()>> + Send;
}
