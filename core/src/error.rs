//! Error types for the intake pipeline.

use thiserror::Error;

/// Result type alias for intake operations.
pub type Result<T> = std::result::Result<T, IntakeError>;

/// Error taxonomy shared by every component of the pipeline.
///
/// The first two variants are caller faults and are safe to show to a
/// visitor. Everything else is an infrastructure failure whose detail
/// belongs in logs only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntakeError {
    // ═══════════════════════════════════════════════════════════
    // Caller Errors
    // ═══════════════════════════════════════════════════════════

    /// Event, form or submission is missing, inactive or unpublished.
    #[error("{0}")]
    NotFound(String),

    /// Input failed structural validation.
    #[error("{0}")]
    BadRequest(String),

    // ═══════════════════════════════════════════════════════════
    // Infrastructure Errors
    // ═══════════════════════════════════════════════════════════

    /// Key-value cache operation failed or timed out.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Durable store operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntakeError {
    /// Shorthand for [`IntakeError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Shorthand for [`IntakeError::BadRequest`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Whether the error was caused by the caller rather than the system.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::BadRequest(_))
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
