//! # Eventform Server
//!
//! HTTP surface of the intake pipeline.
//!
//! ```text
//!   axum Router ──▶ api::forms / api::admin ──▶ IntakeService<C, S>
//!        │                                        │          │
//!   correlation id,                         RedisCache   PostgresStore
//!   trace, CORS
//! ```
//!
//! The router is generic over the cache and store, so tests drive it with
//! the in-memory doubles from `eventform-testing` and the binary with
//! Redis and `PostgreSQL`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError};
pub use routes::build_router;
pub use state::AppState;
