//! Key-value cache trait.

use crate::error::Result;
use std::time::Duration;

/// TTL-bounded string cache (Redis).
///
/// # Implementation Notes
///
/// - `set_nx_ex` must be a single round trip so concurrent callers agree on
///   which one set the key
/// - Implementations should bound every call with a short timeout and
///   report it as [`IntakeError::Cache`](crate::IntakeError::Cache)
pub trait KeyValueCache: Send + Sync {
    /// `GET key`.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable.
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// `SET key value EX ttl`.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable.
    fn set_ex(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// `SET key value EX ttl NX`.
    ///
    /// # Returns
    ///
    /// `true` if the key was newly set, `false` if it already existed.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable.
    fn set_nx_ex(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// `INCR key`, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable or the key is not an integer.
    fn incr(&self, key: &str) -> impl std::future::Future<Output = Result<i64>> + Send;

    /// `DEL key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable.
    fn del(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}
