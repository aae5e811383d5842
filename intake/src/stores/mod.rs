//! Cache implementations.
//!
//! - **Redis cache** - production [`KeyValueCache`](eventform_core::providers::KeyValueCache)
//!   with a bounded per-call timeout

pub mod cache_redis;

pub use cache_redis::RedisCache;
