//! Axum integration for eventform.
//!
//! Everything here is independent of which stores back the pipeline:
//!
//! - [`ApiResponse`]: the `{success, data?, message?}` envelope every endpoint returns
//! - [`AppError`]: maps [`IntakeError`](eventform_core::IntakeError) onto HTTP
//!   status codes and a machine-readable `code`
//! - [`extractors`]: visitor ip and user agent from headers, enveloped JSON bodies
//! - [`middleware`]: correlation id propagation and the per-request span
//! - [`handlers::health`]: liveness and readiness probes
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an axum handler
//! 2. **Extract** path, query, JSON body and visitor headers
//! 3. **Call** the intake service
//! 4. **Wrap** the result in [`ApiResponse`], or map the error through [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use eventform_web::{ApiResponse, WebResult};
//!
//! async fn public_form(
//!     State(state): State<AppState<C, S>>,
//!     Path(slug): Path<String>,
//! ) -> WebResult<ApiResponse<PublicForm>> {
//!     Ok(ApiResponse::ok(state.intake.public_form(&slug).await?))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;

pub use error::AppError;
pub use extractors::{ApiJson, ClientIp, UserAgent};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use response::ApiResponse;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
