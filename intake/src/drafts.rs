//! Draft store.
//!
//! Drafts live only in the cache under `draft:form:{formId}:visitor:{visitorId}`.
//! Every save overwrites the previous draft and restarts its expiry.

use crate::metrics::{DRAFTS_SAVED, side_channel_failure};
use eventform_core::keys;
use eventform_core::providers::KeyValueCache;
use eventform_core::{Draft, FormId, Result, VisitorId};
use std::sync::Arc;
use std::time::Duration;

/// Cache-backed drafts.
pub struct DraftStore<C> {
    cache: Arc<C>,
    ttl: Duration,
}

impl<C> Clone for DraftStore<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
        }
    }
}

impl<C: KeyValueCache> DraftStore<C> {
    /// Create a draft store.
    #[must_use]
    pub const fn new(cache: Arc<C>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Store a draft, replacing any earlier one.
    ///
    /// # Returns
    ///
    /// `false` if the cache rejected the write. The failure is logged.
    ///
    /// # Errors
    ///
    /// Returns error only if the draft cannot be serialized.
    pub async fn save_draft(
        &self,
        form_id: FormId,
        visitor_id: VisitorId,
        draft: &Draft,
    ) -> Result<bool> {
        let payload = serde_json::to_string(draft)?;
        let key = keys::draft(form_id, visitor_id);

        match self.cache.set_ex(&key, &payload, self.ttl).await {
            Ok(()) => {
                metrics::counter!(DRAFTS_SAVED).increment(1);
                tracing::debug!(form_id = %form_id, visitor_id = %visitor_id, "Draft saved");
                Ok(true)
            }
            Err(e) => {
                side_channel_failure("draft");
                tracing::warn!(
                    form_id = %form_id,
                    visitor_id = %visitor_id,
                    error = %e,
                    "Failed to save draft"
                );
                Ok(false)
            }
        }
    }

    /// Fetch the current draft.
    ///
    /// Absent, expired, unreadable and unreachable all come back as `None`.
    pub async fn get_draft(&self, form_id: FormId, visitor_id: VisitorId) -> Option<Draft> {
        let key = keys::draft(form_id, visitor_id);

        let raw = match self.cache.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                side_channel_failure("draft");
                tracing::warn!(
                    form_id = %form_id,
                    visitor_id = %visitor_id,
                    error = %e,
                    "Failed to read draft"
                );
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(draft) => Some(draft),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding unreadable draft");
                None
            }
        }
    }

    /// Delete the draft. Best-effort: failures are logged.
    pub async fn discard(&self, form_id: FormId, visitor_id: VisitorId) {
        if let Err(e) = self.cache.del(&keys::draft(form_id, visitor_id)).await {
            side_channel_failure("draft");
            tracing::warn!(
                form_id = %form_id,
                visitor_id = %visitor_id,
                error = %e,
                "Failed to delete draft"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eventform_testing::MockCache;
    use serde_json::json;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn draft() -> Draft {
        Draft {
            answers: json!({"name": "Ada", "tags": ["a", "b"], "nested": {"n": 1.5}}),
            contact: Some(json!({"email": "ada@example.com"})),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn round_trip_is_deep_equal() {
        let drafts = DraftStore::new(Arc::new(MockCache::new()), DAY);
        let (form, visitor) = (FormId::new(), VisitorId::new());
        let saved = draft();

        assert!(drafts.save_draft(form, visitor, &saved).await.unwrap());
        assert_eq!(drafts.get_draft(form, visitor).await, Some(saved));
    }

    #[tokio::test]
    async fn later_save_supersedes() {
        let drafts = DraftStore::new(Arc::new(MockCache::new()), DAY);
        let (form, visitor) = (FormId::new(), VisitorId::new());

        drafts.save_draft(form, visitor, &draft()).await.unwrap();
        let newer = Draft {
            answers: json!({"name": "Grace"}),
            contact: None,
            updated_at: Utc::now(),
        };
        drafts.save_draft(form, visitor, &newer).await.unwrap();

        assert_eq!(drafts.get_draft(form, visitor).await, Some(newer));
    }

    #[tokio::test]
    async fn draft_expires() {
        let cache = Arc::new(MockCache::new());
        let drafts = DraftStore::new(Arc::clone(&cache), DAY);
        let (form, visitor) = (FormId::new(), VisitorId::new());

        drafts.save_draft(form, visitor, &draft()).await.unwrap();
        cache.advance(DAY + Duration::from_secs(1));

        assert_eq!(drafts.get_draft(form, visitor).await, None);
    }

    #[tokio::test]
    async fn discard_removes_draft() {
        let drafts = DraftStore::new(Arc::new(MockCache::new()), DAY);
        let (form, visitor) = (FormId::new(), VisitorId::new());

        drafts.save_draft(form, visitor, &draft()).await.unwrap();
        drafts.discard(form, visitor).await;

        assert_eq!(drafts.get_draft(form, visitor).await, None);
    }

    #[tokio::test]
    async fn cache_outage_degrades_to_no_draft() {
        let cache = Arc::new(MockCache::new());
        let drafts = DraftStore::new(Arc::clone(&cache), DAY);
        cache.set_failing(true);

        assert!(!drafts.save_draft(FormId::new(), VisitorId::new(), &draft()).await.unwrap());
        assert_eq!(drafts.get_draft(FormId::new(), VisitorId::new()).await, None);
    }

    #[tokio::test]
    async fn corrupt_payload_reads_as_absent() {
        let cache = Arc::new(MockCache::new());
        let drafts = DraftStore::new(Arc::clone(&cache), DAY);
        let (form, visitor) = (FormId::new(), VisitorId::new());

        cache
            .set_ex(&keys::draft(form, visitor), "{not json", DAY)
            .await
            .unwrap();

        assert_eq!(drafts.get_draft(form, visitor).await, None);
    }
}
