//! Session tracker.
//!
//! Records how far a visitor has progressed through an event's form. The
//! status ladder is `VISITED < STARTED < SUBMITTED` and a session never
//! moves down it, whatever order requests arrive in.

use eventform_core::providers::VisitorStore;
use eventform_core::{EventId, Result, SubmissionStatus, VisitSession, VisitorIdentity};
use std::sync::Arc;

/// Visitor and session bookkeeping.
pub struct SessionTracker<S> {
    store: Arc<S>,
}

impl<S> Clone for SessionTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: VisitorStore> SessionTracker<S> {
    /// Create a tracker over a visitor store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Upsert the visitor, then move its session for `event_id` up to `target`.
    ///
    /// Replays and out-of-order arrivals are harmless: the stored status is
    /// the highest target ever recorded.
    ///
    /// # Errors
    ///
    /// Returns error if either store write fails.
    pub async fn record_progress(
        &self,
        identity: &VisitorIdentity,
        event_id: EventId,
        target: SubmissionStatus,
    ) -> Result<VisitSession> {
        let visitor = self.store.upsert_visitor(identity).await?;
        let session = self
            .store
            .advance_session(visitor.id, event_id, target)
            .await?;

        tracing::info!(
            visitor_id = %visitor.id,
            event_id = %event_id,
            requested = %target,
            status = %session.status,
            "Recorded visitor progress"
        );

        Ok(session)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use eventform_testing::MockStore;
    use proptest::prelude::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn replayed_lower_status_is_a_no_op() {
        let store = Arc::new(MockStore::new());
        let tracker = SessionTracker::new(Arc::clone(&store));
        let identity = VisitorIdentity::anonymous(Uuid::new_v4());
        let event_id = EventId::new();

        let started = tracker
            .record_progress(&identity, event_id, SubmissionStatus::Started)
            .await
            .unwrap();
        let replayed = tracker
            .record_progress(&identity, event_id, SubmissionStatus::Visited)
            .await
            .unwrap();

        assert_eq!(replayed.id, started.id);
        assert_eq!(replayed.status, SubmissionStatus::Started);
        assert_eq!(store.visitor_count(), 1);
    }

    #[tokio::test]
    async fn sessions_are_per_event() {
        let store = Arc::new(MockStore::new());
        let tracker = SessionTracker::new(Arc::clone(&store));
        let identity = VisitorIdentity::anonymous(Uuid::new_v4());

        let first = tracker
            .record_progress(&identity, EventId::new(), SubmissionStatus::Submitted)
            .await
            .unwrap();
        let second = tracker
            .record_progress(&identity, EventId::new(), SubmissionStatus::Visited)
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(second.status, SubmissionStatus::Visited);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let store = Arc::new(MockStore::new());
        store.fail_visitor_writes(true);
        let tracker = SessionTracker::new(store);

        let result = tracker
            .record_progress(
                &VisitorIdentity::anonymous(Uuid::new_v4()),
                EventId::new(),
                SubmissionStatus::Visited,
            )
            .await;

        assert!(result.is_err());
    }

    fn status() -> impl Strategy<Value = SubmissionStatus> {
        prop_oneof![
            Just(SubmissionStatus::Visited),
            Just(SubmissionStatus::Started),
            Just(SubmissionStatus::Submitted),
        ]
    }

    proptest! {
        #[test]
        fn final_status_is_maximum_of_any_sequence(
            targets in prop::collection::vec(status(), 1..12)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            let final_status = runtime.block_on(async {
                let tracker = SessionTracker::new(Arc::new(MockStore::new()));
                let identity = VisitorIdentity::anonymous(Uuid::new_v4());
                let event_id = EventId::new();
                let mut last = None;
                for target in &targets {
                    last = Some(
                        tracker
                            .record_progress(&identity, event_id, *target)
                            .await
                            .unwrap()
                            .status,
                    );
                }
                last
            });

            prop_assert_eq!(final_status, targets.iter().copied().max());
        }
    }
}
