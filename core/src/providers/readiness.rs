//! Readiness probe trait.

use crate::error::Result;

/// A dependency that can report whether it is reachable.
pub trait Readiness: Send + Sync {
    /// Round-trip to the backing service.
    ///
    /// # Errors
    ///
    /// Returns error if the service does not answer.
    fn check_ready(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}
