//! HTTP API handlers.
//!
//! - [`forms`]: visitor-facing endpoints under `/api/forms/:slug`
//! - [`admin`]: organizer reads under `/api/admin`

pub mod admin;
pub mod forms;

use eventform_web::AppError;
use uuid::Uuid;

/// Parse a path id into one of the typed id wrappers.
fn parse_id<T: From<Uuid>>(raw: &str, what: &str) -> Result<T, AppError> {
    Uuid::parse_str(raw)
        .map(T::from)
        .map_err(|_| AppError::bad_request(format!("Invalid {what} id")))
}
