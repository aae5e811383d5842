//! Visitor-facing endpoints.
//!
//! - GET  /api/forms/:slug        - Public form projection
//! - POST /api/forms/:slug/visit  - Record a visit
//! - POST /api/forms/:slug/start  - Record that the visitor started filling in
//! - POST /api/forms/:slug/submit - Final submission (201)
//! - POST /api/forms/:slug/draft  - Save work in progress
//! - GET  /api/forms/:slug/draft  - Load work in progress (`?visitorUuid=`)

use crate::state::AppState;
use axum::extract::{Path, Query, State};
use eventform_core::providers::{DurableStore, KeyValueCache, Readiness};
use eventform_core::{
    AnswerInput, ContactInput, Draft, PublicForm, SubmissionReceipt, VisitorIdentity,
};
use eventform_intake::validation::parse_visitor_uuid;
use eventform_intake::{DraftReceipt, SubmissionInput};
use eventform_web::{ApiJson, ApiResponse, ClientIp, UserAgent, WebResult};
use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// Request Types
// ============================================================================

/// Visitor as sent by the client.
///
/// Only `uuid` is required. `ipAddress` and `userAgent` are used when the
/// request headers carry none.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorPayload {
    /// Client-generated visitor UUID.
    pub uuid: Option<String>,
    /// Self-reported IP address.
    pub ip_address: Option<String>,
    /// Self-reported user agent.
    pub user_agent: Option<String>,
}

/// Body of `visit` and `start`.
#[derive(Debug, Default, Deserialize)]
pub struct VisitorRequest {
    /// The visitor.
    #[serde(default)]
    pub visitor: Option<VisitorPayload>,
}

/// Body of `submit`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// The visitor.
    #[serde(default)]
    pub visitor: Option<VisitorPayload>,
    /// Optional contact details.
    #[serde(default)]
    pub contact: Option<ContactInput>,
    /// Answers.
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

/// Body of `POST draft`.
#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    /// The visitor.
    #[serde(default)]
    pub visitor: Option<VisitorPayload>,
    /// Work-in-progress answers, stored verbatim.
    #[serde(default)]
    pub answers: Value,
    /// Work-in-progress contact, stored verbatim.
    #[serde(default)]
    pub contact: Option<Value>,
}

/// Query of `GET draft`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftQuery {
    /// Visitor UUID.
    pub visitor_uuid: Option<String>,
}

/// Who is calling: body UUID plus ip and user agent, headers first.
fn identity(
    visitor: Option<VisitorPayload>,
    ClientIp(ip): ClientIp,
    UserAgent(user_agent): UserAgent,
) -> WebResult<VisitorIdentity> {
    let visitor = visitor.unwrap_or_default();
    let uuid = parse_visitor_uuid(visitor.uuid.as_deref())?;

    Ok(VisitorIdentity {
        uuid,
        ip_address: ip.map(|ip| ip.to_string()).or(visitor.ip_address),
        user_agent: user_agent.or(visitor.user_agent),
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Public projection of the form behind `slug`.
///
/// # Errors
///
/// 404 if the event is not active or the form is not published.
pub async fn public_form<C, S>(
    State(state): State<AppState<C, S>>,
    Path(slug): Path<String>,
) -> WebResult<ApiResponse<PublicForm>>
where
    C: KeyValueCache + Readiness + 'static,
    S: DurableStore + 'static,
{
    Ok(ApiResponse::ok(state.intake.public_form(&slug).await?))
}

/// Record a visit.
///
/// # Errors
///
/// 400 for a missing or malformed visitor UUID, 404 if the event is not active.
pub async fn record_visit<C, S>(
    State(state): State<AppState<C, S>>,
    Path(slug): Path<String>,
    client_ip: ClientIp,
    user_agent: UserAgent,
    ApiJson(body): ApiJson<VisitorRequest>,
) -> WebResult<ApiResponse<()>>
where
    C: KeyValueCache + Readiness + 'static,
    S: DurableStore + 'static,
{
    let visitor = identity(body.visitor, client_ip, user_agent)?;
    state.intake.record_visit(&slug, &visitor).await?;
    Ok(ApiResponse::empty())
}

/// Record that the visitor started filling in the form.
///
/// # Errors
///
/// 400 for a missing or malformed visitor UUID, 404 if the event is not
/// active or the form is not published.
pub async fn start_submission<C, S>(
    State(state): State<AppState<C, S>>,
    Path(slug): Path<String>,
    client_ip: ClientIp,
    user_agent: UserAgent,
    ApiJson(body): ApiJson<VisitorRequest>,
) -> WebResult<ApiResponse<()>>
where
    C: KeyValueCache + Readiness + 'static,
    S: DurableStore + 'static,
{
    let visitor = identity(body.visitor, client_ip, user_agent)?;
    state.intake.start_submission(&slug, &visitor).await?;
    Ok(ApiResponse::empty())
}

/// Final submission.
///
/// # Errors
///
/// 400 for validation failures, 404 if the event is not active or the form
/// is not published, 500 if the transaction fails.
pub async fn submit<C, S>(
    State(state): State<AppState<C, S>>,
    Path(slug): Path<String>,
    client_ip: ClientIp,
    user_agent: UserAgent,
    ApiJson(body): ApiJson<SubmitRequest>,
) -> WebResult<ApiResponse<SubmissionReceipt>>
where
    C: KeyValueCache + Readiness + 'static,
    S: DurableStore + 'static,
{
    let input = SubmissionInput {
        visitor: identity(body.visitor, client_ip, user_agent)?,
        contact: body.contact,
        answers: body.answers,
    };

    let receipt = state.intake.submit(&slug, input).await?;
    Ok(ApiResponse::created(receipt))
}

/// Save a draft.
///
/// A cache outage is reported as `saved: false` with status 200.
///
/// # Errors
///
/// 400 for a missing or malformed visitor UUID, 404 if the event is not
/// active or the form is not published.
pub async fn save_draft<C, S>(
    State(state): State<AppState<C, S>>,
    Path(slug): Path<String>,
    client_ip: ClientIp,
    user_agent: UserAgent,
    ApiJson(body): ApiJson<DraftRequest>,
) -> WebResult<ApiResponse<DraftReceipt>>
where
    C: KeyValueCache + Readiness + 'static,
    S: DurableStore + 'static,
{
    let visitor = identity(body.visitor, client_ip, user_agent)?;
    let receipt = state
        .intake
        .save_draft(&slug, &visitor, body.answers, body.contact)
        .await?;

    let response = if receipt.saved {
        ApiResponse::ok(receipt)
    } else {
        ApiResponse::ok(receipt).with_message("Draft could not be saved")
    };
    Ok(response)
}

/// Load a draft; `data` is `null` when there is none.
///
/// # Errors
///
/// 400 for a missing or malformed visitor UUID, 404 if the event is not
/// active or the form is not published.
pub async fn get_draft<C, S>(
    State(state): State<AppState<C, S>>,
    Path(slug): Path<String>,
    client_ip: ClientIp,
    user_agent: UserAgent,
    Query(query): Query<DraftQuery>,
) -> WebResult<ApiResponse<Option<Draft>>>
where
    C: KeyValueCache + Readiness + 'static,
    S: DurableStore + 'static,
{
    let payload = VisitorPayload {
        uuid: query.visitor_uuid,
        ..VisitorPayload::default()
    };
    let visitor = identity(Some(payload), client_ip, user_agent)?;
    Ok(ApiResponse::ok(state.intake.get_draft(&slug, &visitor).await?))
}
