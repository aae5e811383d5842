//! Visitor and visit-session store trait.

use crate::error::Result;
use crate::ids::{EventId, VisitorId};
use crate::model::{SubmissionStatus, VisitSession, Visitor, VisitorIdentity};

/// Visitor and session persistence.
///
/// # Implementation Notes
///
/// - Visitors are keyed by the client UUID and never deleted
/// - Sessions are unique per `(visitor, event)` and their status never
///   decreases
pub trait VisitorStore: Send + Sync {
    /// Create the visitor or refresh its last-seen data.
    ///
    /// An absent `ip_address` or `user_agent` keeps the stored value.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn upsert_visitor(
        &self,
        identity: &VisitorIdentity,
    ) -> impl std::future::Future<Output = Result<Visitor>> + Send;

    /// Move a session to `target` if that ranks higher than its current
    /// status, creating it if absent.
    ///
    /// Must be a single atomic conditional write: the stored status is the
    /// maximum of every target ever supplied, whatever the interleaving.
    ///
    /// # Returns
    ///
    /// The session as stored after the write.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn advance_session(
        &self,
        visitor_id: VisitorId,
        event_id: EventId,
        target: SubmissionStatus,
    ) -> impl std::future::Future<Output = Result<VisitSession>> + Send;
}
