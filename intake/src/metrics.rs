//! Pipeline metrics.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `eventform_analytics_recorded_total{metric}` - Unique funnel events counted
//! - `eventform_side_channel_failures_total{channel}` - Best-effort cache calls that failed
//! - `eventform_submissions_committed_total` - Submissions committed
//! - `eventform_public_form_cache_total{result}` - Public form lookups by hit/miss/error
//! - `eventform_drafts_saved_total` - Drafts written

use metrics::describe_counter;

pub(crate) const ANALYTICS_RECORDED: &str = "eventform_analytics_recorded_total";
pub(crate) const SIDE_CHANNEL_FAILURES: &str = "eventform_side_channel_failures_total";
pub(crate) const SUBMISSIONS_COMMITTED: &str = "eventform_submissions_committed_total";
pub(crate) const PUBLIC_FORM_CACHE: &str = "eventform_public_form_cache_total";
pub(crate) const DRAFTS_SAVED: &str = "eventform_drafts_saved_total";

/// Register descriptions for every pipeline metric.
///
/// Call once at startup, after installing a recorder.
pub fn register_intake_metrics() {
    describe_counter!(
        ANALYTICS_RECORDED,
        "Unique funnel events counted, by metric (visits, started, submitted)"
    );
    describe_counter!(
        SIDE_CHANNEL_FAILURES,
        "Best-effort cache operations that failed, by channel (analytics, draft, public_form)"
    );
    describe_counter!(
        SUBMISSIONS_COMMITTED,
        "Form submissions committed to the durable store"
    );
    describe_counter!(
        PUBLIC_FORM_CACHE,
        "Public form lookups, by result (hit, miss, error)"
    );
    describe_counter!(DRAFTS_SAVED, "Drafts written to the cache");

    tracing::info!("Intake metrics registered");
}

/// Count a failed best-effort cache call.
pub(crate) fn side_channel_failure(channel: &'static str) {
    metrics::counter!(SIDE_CHANNEL_FAILURES, "channel" => channel).increment(1);
}
