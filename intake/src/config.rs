//! Pipeline configuration.
//!
//! Expiry windows for everything the pipeline keeps in the cache, plus the
//! per-call cache timeout. Values come from the application, not from here.

use std::time::Duration;

/// Intake pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeConfig {
    /// How long a per-visitor analytics marker suppresses re-counting.
    ///
    /// Default: 24 hours
    pub analytics_dedup_ttl: Duration,

    /// Draft lifetime.
    ///
    /// Default: 24 hours
    pub draft_ttl: Duration,

    /// Public form cache lifetime.
    ///
    /// Default: 1 hour
    pub public_form_ttl: Duration,

    /// Upper bound on a single cache round trip.
    ///
    /// Default: 250 milliseconds
    pub cache_timeout: Duration,
}

impl IntakeConfig {
    /// Create configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            analytics_dedup_ttl: Duration::from_secs(24 * 60 * 60),
            draft_ttl: Duration::from_secs(24 * 60 * 60),
            public_form_ttl: Duration::from_secs(60 * 60),
            cache_timeout: Duration::from_millis(250),
        }
    }

    /// Set analytics dedup window.
    #[must_use]
    pub const fn with_analytics_dedup_ttl(mut self, ttl: Duration) -> Self {
        self.analytics_dedup_ttl = ttl;
        self
    }

    /// Set draft lifetime.
    #[must_use]
    pub const fn with_draft_ttl(mut self, ttl: Duration) -> Self {
        self.draft_ttl = ttl;
        self
    }

    /// Set public form cache lifetime.
    #[must_use]
    pub const fn with_public_form_ttl(mut self, ttl: Duration) -> Self {
        self.public_form_ttl = ttl;
        self
    }

    /// Set cache call timeout.
    #[must_use]
    pub const fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = timeout;
        self
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self::new()
    }
}
