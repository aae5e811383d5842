//! Public form cache.
//!
//! Read-through cache of the visitor-facing form projection, keyed by event
//! slug with a fixed TTL. A cache that is down or holds garbage only costs
//! a directory lookup.

use crate::metrics::{PUBLIC_FORM_CACHE, side_channel_failure};
use eventform_core::keys;
use eventform_core::providers::{EventDirectory, FormDirectory, KeyValueCache};
use eventform_core::{IntakeError, PublicForm, Result};
use std::sync::Arc;
use std::time::Duration;

/// Read-through public form lookups.
pub struct PublicFormCache<C, D> {
    cache: Arc<C>,
    directory: Arc<D>,
    ttl: Duration,
}

impl<C, D> Clone for PublicFormCache<C, D> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            directory: Arc::clone(&self.directory),
            ttl: self.ttl,
        }
    }
}

impl<C, D> PublicFormCache<C, D>
where
    C: KeyValueCache,
    D: EventDirectory + FormDirectory,
{
    /// Create the cache.
    #[must_use]
    pub const fn new(cache: Arc<C>, directory: Arc<D>, ttl: Duration) -> Self {
        Self {
            cache,
            directory,
            ttl,
        }
    }

    /// Public projection of the form behind `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::NotFound`] if the event is missing or not
    /// active, or its form is missing or unpublished. Directory failures
    /// propagate.
    pub async fn get_public_form(&self, slug: &str) -> Result<PublicForm> {
        let key = keys::public_form(slug);

        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<PublicForm>(&raw) {
                Ok(form) => {
                    metrics::counter!(PUBLIC_FORM_CACHE, "result" => "hit").increment(1);
                    return Ok(form);
                }
                Err(e) => {
                    tracing::warn!(slug, error = %e, "Ignoring unreadable cached form");
                }
            },
            Ok(None) => {}
            Err(e) => {
                metrics::counter!(PUBLIC_FORM_CACHE, "result" => "error").increment(1);
                side_channel_failure("public_form");
                tracing::warn!(slug, error = %e, "Public form cache read failed");
            }
        }

        metrics::counter!(PUBLIC_FORM_CACHE, "result" => "miss").increment(1);
        let form = self.load(slug).await?;

        match serde_json::to_string(&form) {
            Ok(payload) => {
                if let Err(e) = self.cache.set_ex(&key, &payload, self.ttl).await {
                    side_channel_failure("public_form");
                    tracing::warn!(slug, error = %e, "Public form cache write failed");
                }
            }
            Err(e) => tracing::warn!(slug, error = %e, "Public form not cacheable"),
        }

        Ok(form)
    }

    /// Drop the cached projection for `slug`.
    ///
    /// Nothing in this crate calls it; a form-editing service should after
    /// changing a published form.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable.
    pub async fn invalidate(&self, slug: &str) -> Result<()> {
        self.cache.del(&keys::public_form(slug)).await
    }

    async fn load(&self, slug: &str) -> Result<PublicForm> {
        let event = self
            .directory
            .find_event_by_slug(slug)
            .await?
            .filter(eventform_core::Event::is_active)
            .ok_or_else(|| IntakeError::not_found("Event not found"))?;

        let form = self
            .directory
            .find_form_by_event_id(event.id)
            .await?
            .filter(eventform_core::Form::is_published)
            .ok_or_else(|| IntakeError::not_found("Form not found"))?;

        PublicForm::project(&event, &form)
    }
}
