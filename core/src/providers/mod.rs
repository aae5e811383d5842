//! Collaborator traits.
//!
//! The pipeline never talks to Redis or PostgreSQL directly. Every external
//! dependency sits behind one of these traits and is injected at startup.
//!
//! ```text
//!                      ┌──────────────────────┐
//!  inbound action ───▶ │ EventDirectory       │  read-only lookups
//!                      │ FormDirectory        │
//!                      └──────────────────────┘
//!                      ┌──────────────────────┐
//!                      │ VisitorStore         │  visitors, sessions
//!                      │ SubmissionStore      │  transactional commit,
//!                      │  └ Transaction       │  admin reads
//!                      └──────────────────────┘
//!                      ┌──────────────────────┐
//!                      │ KeyValueCache        │  drafts, analytics,
//!                      └──────────────────────┘  public form cache
//! ```
//!
//! Production implementations live in `eventform-postgres` and
//! `eventform-intake::stores`; in-memory mocks live in `eventform-testing`.

pub mod cache;
pub mod directory;
pub mod readiness;
pub mod submission;
pub mod visitor;

pub use cache::KeyValueCache;
pub use directory::{EventDirectory, FormDirectory};
pub use readiness::Readiness;
pub use submission::{SubmissionStore, SubmissionTransaction};
pub use visitor::VisitorStore;

/// Everything the pipeline needs from the durable side.
///
/// Blanket-implemented for any type that provides all four traits, so a
/// single store value can be injected for the whole pipeline.
pub trait DurableStore:
    EventDirectory + FormDirectory + VisitorStore + SubmissionStore + Readiness
{
}

impl<T> DurableStore for T where
    T: EventDirectory + FormDirectory + VisitorStore + SubmissionStore + Readiness
{
}
