//! # Eventform Core
//!
//! Domain types and collaborator traits for the visitor-session and
//! submission pipeline of a multi-tenant event/form builder.
//!
//! Anonymous visitors move through a published form in three steps:
//!
//! ```text
//!   VISITED ──▶ STARTED ──▶ SUBMITTED
//! ```
//!
//! This crate holds what every other crate agrees on:
//!
//! - **Model**: events, forms, visitors, sessions, contacts, submissions
//! - **Errors**: [`IntakeError`] and the [`Result`] alias
//! - **Providers**: traits for the key-value cache and the durable store
//! - **Keys**: the cache key layout
//! - **Public forms**: the projection served to visitors
//!
//! It performs no I/O.

pub mod error;
pub mod ids;
pub mod keys;
pub mod model;
pub mod providers;
pub mod public_form;

pub use error::{IntakeError, Result};
pub use ids::{
    AnswerId, ContactId, EventId, FieldId, FormId, StepId, SubmissionId, VisitSessionId,
    VisitorId,
};
pub use keys::AnalyticsMetric;
pub use model::{
    AnswerInput, AnswerValue, AnswerValueFields, Contact, ContactInput, Draft, Event,
    EventAnalytics, EventStatus, Form, FormField, FormStep, FormSubmission, SubmissionAnswer,
    SubmissionDetail, SubmissionPage, SubmissionQuery, SubmissionReceipt, SubmissionStatus,
    VisitSession, Visitor, VisitorIdentity,
};
pub use public_form::{PublicEvent, PublicField, PublicForm, PublicFormBody, PublicStep};
