//! # Eventform Intake
//!
//! The visitor-session and submission pipeline.
//!
//! ```text
//!   inbound action ──▶ IntakeService ──▶ EventDirectory / FormDirectory
//!                          │
//!          ┌───────────────┼───────────────────┬─────────────────┐
//!          ▼               ▼                   ▼                 ▼
//!   SessionTracker   SubmissionCommitter   DraftStore     PublicFormCache
//!   (durable store)  (one transaction)     (cache only)   (read-through)
//!          │               │
//!          └──────┬────────┘
//!                 ▼
//!         AnalyticsCounter  (best-effort, cache only)
//! ```
//!
//! Durable writes (visitors, sessions, submissions) are authoritative and
//! their failures surface to the caller. Cache work (analytics, drafts,
//! public form cache) degrades quietly when the cache is unavailable.
//!
//! # Example
//!
//! ```ignore
//! use eventform_intake::{IntakeConfig, IntakeService};
//! use std::sync::Arc;
//!
//! let service = IntakeService::new(Arc::new(cache), Arc::new(store), IntakeConfig::default());
//! let session = service.record_visit("spring-gala", &identity).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analytics;
pub mod committer;
pub mod config;
pub mod drafts;
pub mod metrics;
pub mod public_form;
pub mod service;
pub mod session;
pub mod stores;
pub mod validation;

pub use analytics::AnalyticsCounter;
pub use committer::{PublishedForm, SubmissionCommitter};
pub use config::IntakeConfig;
pub use drafts::DraftStore;
pub use crate::metrics::register_intake_metrics;
pub use public_form::PublicFormCache;
pub use service::{DraftReceipt, IntakeService};
pub use session::SessionTracker;
pub use validation::{SubmissionInput, SubmissionListParams, ValidSubmission};
