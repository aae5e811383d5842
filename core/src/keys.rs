//! Cache key scheme.
//!
//! | Key | Value | TTL |
//! |-----|-------|-----|
//! | `public:form:{slug}` | JSON [`PublicForm`](crate::PublicForm) | 1h |
//! | `draft:form:{formId}:visitor:{visitorId}` | JSON [`Draft`](crate::Draft) | 24h |
//! | `analytics:event:{eventId}:visitor:{visitorId}:{metric}` | `"1"` marker | 24h |
//! | `analytics:event:{eventId}:{metric}` | integer counter | none |

use crate::ids::{EventId, FormId, VisitorId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Funnel step counted by the analytics side channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsMetric {
    /// Form viewed.
    Visits,
    /// Form started.
    Started,
    /// Form submitted.
    Submitted,
}

impl AnalyticsMetric {
    /// All metrics, in funnel order.
    pub const ALL: [Self; 3] = [Self::Visits, Self::Started, Self::Submitted];

    /// Key segment for this metric.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visits => "visits",
            Self::Started => "started",
            Self::Submitted => "submitted",
        }
    }
}

impl fmt::Display for AnalyticsMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached public projection of a form.
#[must_use]
pub fn public_form(slug: &str) -> String {
    format!("public:form:{slug}")
}

/// Draft for one `(form, visitor)` pair.
#[must_use]
pub fn draft(form_id: FormId, visitor_id: VisitorId) -> String {
    format!("draft:form:{form_id}:visitor:{visitor_id}")
}

/// Per-visitor dedup marker.
#[must_use]
pub fn analytics_marker(
    event_id: EventId,
    visitor_id: VisitorId,
    metric: AnalyticsMetric,
) -> String {
    format!("analytics:event:{event_id}:visitor:{visitor_id}:{metric}")
}

/// Aggregate counter.
#[must_use]
pub fn analytics_counter(event_id: EventId, metric: AnalyticsMetric) -> String {
    format!("analytics:event:{event_id}:{metric}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn keys_follow_documented_layout() {
        let event = EventId(Uuid::nil());
        let form = FormId(Uuid::nil());
        let visitor = VisitorId(Uuid::nil());
        let nil = Uuid::nil();

        assert_eq!(public_form("spring-gala"), "public:form:spring-gala");
        assert_eq!(draft(form, visitor), format!("draft:form:{nil}:visitor:{nil}"));
        assert_eq!(
            analytics_marker(event, visitor, AnalyticsMetric::Started),
            format!("analytics:event:{nil}:visitor:{nil}:started")
        );
        assert_eq!(
            analytics_counter(event, AnalyticsMetric::Visits),
            format!("analytics:event:{nil}:visits")
        );
    }
}
