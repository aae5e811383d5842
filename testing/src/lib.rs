//! # Eventform Testing
//!
//! In-memory doubles for the intake pipeline's collaborators.
//!
//! - [`MockCache`]: a [`KeyValueCache`](eventform_core::providers::KeyValueCache)
//!   with a manual clock and an outage switch
//! - [`MockStore`]: every durable-store trait, with staged transactions and
//!   failure injection
//! - [`fixtures`]: ready-made events and forms
//!
//! ## Example
//!
//! ```
//! use eventform_testing::{MockCache, MockStore, fixtures};
//!
//! let cache = MockCache::new();
//! let store = MockStore::new();
//! let (event, form) = fixtures::published_form("spring-gala");
//! store.insert_directory(event, form);
//!
//! cache.set_failing(true);
//! assert_eq!(store.submission_count(), 0);
//! ```

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Only panics on a poisoned lock

pub mod cache;
pub mod fixtures;
pub mod store;

pub use cache::MockCache;
pub use store::{MockStore, MockTransaction};
