//! Event and form directory traits.
//!
//! Read-only views over organizer data. Event and form CRUD lives elsewhere.

use crate::error::Result;
use crate::ids::EventId;
use crate::model::{Event, Form};

/// Event lookups.
pub trait EventDirectory: Send + Sync {
    /// Find an event by its public slug, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn find_event_by_slug(
        &self,
        slug: &str,
    ) -> impl std::future::Future<Output = Result<Option<Event>>> + Send;

    /// Find an event by id.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn find_event_by_id(
        &self,
        event_id: EventId,
    ) -> impl std::future::Future<Output = Result<Option<Event>>> + Send;
}

/// Form lookups.
pub trait FormDirectory: Send + Sync {
    /// Find the form attached to an event, published or not.
    ///
    /// Steps come back ordered by step number and fields by `order`.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn find_form_by_event_id(
        &self,
        event_id: EventId,
    ) -> impl std::future::Future<Output = Result<Option<Form>>> + Send;
}
