//! Organizer endpoints.
//!
//! - GET    /api/admin/submissions/:id        - One submission with contact and answers
//! - DELETE /api/admin/submissions/:id        - Soft delete
//! - GET    /api/admin/events/:id/submissions - Paged list
//! - GET    /api/admin/events/:id/analytics   - Funnel counters
//! - DELETE /api/admin/forms/:slug/cache      - Drop the cached public form
//!
//! The list accepts `status`, `limit`, `offset`, `fromDate` and `toDate`.

use super::parse_id;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use eventform_core::providers::{DurableStore, KeyValueCache, Readiness};
use eventform_core::{EventAnalytics, EventId, SubmissionDetail, SubmissionId, SubmissionPage};
use eventform_intake::SubmissionListParams;
use eventform_web::{ApiResponse, WebResult};

/// One submission.
///
/// # Errors
///
/// 400 for a malformed id, 404 if absent or deleted.
pub async fn get_submission<C, S>(
    State(state): State<AppState<C, S>>,
    Path(id): Path<String>,
) -> WebResult<ApiResponse<SubmissionDetail>>
where
    C: KeyValueCache + Readiness + 'static,
    S: DurableStore + 'static,
{
    let submission_id: SubmissionId = parse_id(&id, "submission")?;
    Ok(ApiResponse::ok(state.intake.submission(submission_id).await?))
}

/// Soft-delete a submission.
///
/// # Errors
///
/// 400 for a malformed id, 404 if absent or already deleted.
pub async fn delete_submission<C, S>(
    State(state): State<AppState<C, S>>,
    Path(id): Path<String>,
) -> WebResult<ApiResponse<()>>
where
    C: KeyValueCache + Readiness + 'static,
    S: DurableStore + 'static,
{
    let submission_id: SubmissionId = parse_id(&id, "submission")?;
    state.intake.delete_submission(submission_id).await?;
    Ok(ApiResponse::empty().with_message("Submission deleted"))
}

/// A page of an event's submissions, newest first.
///
/// # Errors
///
/// 400 for a malformed id or filter, 404 if the event does not exist.
pub async fn list_submissions<C, S>(
    State(state): State<AppState<C, S>>,
    Path(id): Path<String>,
    Query(params): Query<SubmissionListParams>,
) -> WebResult<ApiResponse<SubmissionPage>>
where
    C: KeyValueCache + Readiness + 'static,
    S: DurableStore + 'static,
{
    let event_id: EventId = parse_id(&id, "event")?;
    let query = params.into_query()?;
    Ok(ApiResponse::ok(
        state.intake.submissions_for_event(event_id, &query).await?,
    ))
}

/// Visit, start and submit counters for an event.
///
/// # Errors
///
/// 400 for a malformed id, 404 if the event does not exist, 500 if the
/// cache is unreachable.
pub async fn event_analytics<C, S>(
    State(state): State<AppState<C, S>>,
    Path(id): Path<String>,
) -> WebResult<ApiResponse<EventAnalytics>>
where
    C: KeyValueCache + Readiness + 'static,
    S: DurableStore + 'static,
{
    let event_id: EventId = parse_id(&id, "event")?;
    Ok(ApiResponse::ok(state.intake.event_analytics(event_id).await?))
}

/// Drop the cached public projection of a form so the next read reloads it.
///
/// # Errors
///
/// 500 if the cache is unreachable.
pub async fn refresh_public_form<C, S>(
    State(state): State<AppState<C, S>>,
    Path(slug): Path<String>,
) -> WebResult<ApiResponse<()>>
where
    C: KeyValueCache + Readiness + 'static,
    S: DurableStore + 'static,
{
    state.intake.invalidate_public_form(&slug).await?;
    tracing::info!(slug = %slug, "Public form cache cleared");
    Ok(ApiResponse::empty().with_message("Public form cache cleared"))
}
