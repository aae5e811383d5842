//! Analytics counter.
//!
//! Counts each visitor at most once per funnel step within the dedup window.
//! Counting is a side channel: a cache outage loses counts, never requests.

use crate::metrics::{ANALYTICS_RECORDED, side_channel_failure};
use eventform_core::keys::{self, AnalyticsMetric};
use eventform_core::providers::KeyValueCache;
use eventform_core::{EventAnalytics, EventId, IntakeError, Result, VisitorId};
use std::sync::Arc;
use std::time::Duration;

/// Deduplicating per-event counters.
pub struct AnalyticsCounter<C> {
    cache: Arc<C>,
    dedup_ttl: Duration,
}

impl<C> Clone for AnalyticsCounter<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            dedup_ttl: self.dedup_ttl,
        }
    }
}

impl<C: KeyValueCache> AnalyticsCounter<C> {
    /// Create a counter.
    #[must_use]
    pub const fn new(cache: Arc<C>, dedup_ttl: Duration) -> Self {
        Self { cache, dedup_ttl }
    }

    /// Count `metric` for this visitor unless it was already counted within
    /// the dedup window.
    ///
    /// The marker is claimed with `SET NX EX` and the aggregate is only
    /// incremented by the caller that claimed it. Never fails: cache errors
    /// are logged and reported as `false`.
    pub async fn record_once(
        &self,
        event_id: EventId,
        visitor_id: VisitorId,
        metric: AnalyticsMetric,
    ) -> bool {
        match self.try_record_once(event_id, visitor_id, metric).await {
            Ok(counted) => counted,
            Err(e) => {
                side_channel_failure("analytics");
                tracing::warn!(
                    event_id = %event_id,
                    visitor_id = %visitor_id,
                    metric = %metric,
                    error = %e,
                    "Analytics update failed, continuing"
                );
                false
            }
        }
    }

    async fn try_record_once(
        &self,
        event_id: EventId,
        visitor_id: VisitorId,
        metric: AnalyticsMetric,
    ) -> Result<bool> {
        let marker = keys::analytics_marker(event_id, visitor_id, metric);
        if !self.cache.set_nx_ex(&marker, "1", self.dedup_ttl).await? {
            return Ok(false);
        }

        let total = self
            .cache
            .incr(&keys::analytics_counter(event_id, metric))
            .await?;

        metrics::counter!(ANALYTICS_RECORDED, "metric" => metric.as_str()).increment(1);
        tracing::debug!(event_id = %event_id, metric = %metric, total, "Counted unique visitor");

        Ok(true)
    }

    /// Read the aggregate counters for an event.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable or holds a non-integer counter.
    pub async fn snapshot(&self, event_id: EventId) -> Result<EventAnalytics> {
        let mut counts = [0_i64; 3];
        for (slot, metric) in counts.iter_mut().zip(AnalyticsMetric::ALL) {
            let key = keys::analytics_counter(event_id, metric);
            *slot = match self.cache.get(&key).await? {
                Some(raw) => raw.parse().map_err(|_| {
                    IntakeError::Cache(format!("Counter {key} is not an integer: {raw}"))
                })?,
                None => 0,
            };
        }

        let [visits, started, submitted] = counts;
        Ok(EventAnalytics::from_counters(event_id, visits, started, submitted))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use eventform_testing::MockCache;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn counter() -> (Arc<MockCache>, AnalyticsCounter<MockCache>) {
        let cache = Arc::new(MockCache::new());
        (Arc::clone(&cache), AnalyticsCounter::new(cache, DAY))
    }

    #[tokio::test]
    async fn same_visitor_counts_once_within_window() {
        let (cache, analytics) = counter();
        let (event, visitor) = (EventId::new(), VisitorId::new());

        assert!(analytics.record_once(event, visitor, AnalyticsMetric::Visits).await);
        assert!(!analytics.record_once(event, visitor, AnalyticsMetric::Visits).await);

        let key = keys::analytics_counter(event, AnalyticsMetric::Visits);
        assert_eq!(cache.peek(&key).as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn visitor_counts_again_after_window() {
        let (cache, analytics) = counter();
        let (event, visitor) = (EventId::new(), VisitorId::new());

        analytics.record_once(event, visitor, AnalyticsMetric::Started).await;
        cache.advance(DAY + Duration::from_secs(1));
        assert!(analytics.record_once(event, visitor, AnalyticsMetric::Started).await);

        let snapshot = analytics.snapshot(event).await.unwrap();
        assert_eq!(snapshot.total_started, 2);
    }

    #[tokio::test]
    async fn metrics_are_independent() {
        let (_cache, analytics) = counter();
        let (event, visitor) = (EventId::new(), VisitorId::new());

        for metric in AnalyticsMetric::ALL {
            assert!(analytics.record_once(event, visitor, metric).await);
        }
        analytics
            .record_once(event, VisitorId::new(), AnalyticsMetric::Visits)
            .await;

        let snapshot = analytics.snapshot(event).await.unwrap();
        assert_eq!(snapshot.total_visits, 2);
        assert_eq!(snapshot.total_started, 1);
        assert_eq!(snapshot.total_submitted, 1);
        assert!((snapshot.conversion_rate - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn cache_outage_is_swallowed() {
        let (cache, analytics) = counter();
        cache.set_failing(true);

        assert!(
            !analytics
                .record_once(EventId::new(), VisitorId::new(), AnalyticsMetric::Visits)
                .await
        );
    }

    #[tokio::test]
    async fn snapshot_of_unknown_event_is_zero() {
        let (_cache, analytics) = counter();
        let snapshot = analytics.snapshot(EventId::new()).await.unwrap();

        assert_eq!(snapshot.total_visits, 0);
        assert!(snapshot.conversion_rate.abs() < f64::EPSILON);
    }
}
