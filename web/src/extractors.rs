//! Custom Axum extractors.
//!
//! - `ClientIp`: Visitor IP from proxy headers or the connection
//! - `UserAgent`: Visitor `User-Agent` header
//! - `ApiJson`: JSON body whose rejection uses the API error envelope
//!
//! `ClientIp` and `UserAgent` never reject: a missing value is reported as
//! `None` and the pipeline keeps whatever it stored before.
//!
//! # Examples
//!
//! ```ignore
//! use eventform_web::extractors::{ApiJson, ClientIp, UserAgent};
//!
//! async fn record_visit(
//!     ClientIp(ip): ClientIp,
//!     UserAgent(user_agent): UserAgent,
//!     ApiJson(body): ApiJson<VisitBody>,
//! ) -> WebResult<ApiResponse<()>> {
//!     let identity = VisitorIdentity {
//!         uuid,
//!         ip_address: ip.map(|ip| ip.to_string()),
//!         user_agent,
//!     };
//!     // ...
//! }
//! ```

use crate::error::AppError;
use axum::{
    Json, async_trait,
    extract::{ConnectInfo, FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::{HeaderMap, header, request::Parts},
};
use serde::de::DeserializeOwned;
use std::net::{IpAddr, SocketAddr};

/// Client IP address.
///
/// # Priority
///
/// 1. `X-Forwarded-For` (first IP in the list)
/// 2. `X-Real-IP`
/// 3. Connection address, when the server was started with connect info
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub Option<IpAddr>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let connect_info = parts.extensions.get::<ConnectInfo<SocketAddr>>();
        Ok(Self(extract_client_ip(&parts.headers, connect_info)))
    }
}

fn extract_client_ip(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Option<IpAddr> {
    let header_ip = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    header_ip("X-Forwarded-For")
        .or_else(|| header_ip("X-Real-IP"))
        .or_else(|| connect_info.map(|ConnectInfo(addr)| addr.ip()))
}

/// `User-Agent` header, `None` when absent or not valid text.
#[derive(Debug, Clone)]
pub struct UserAgent(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for UserAgent
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(Self(user_agent))
    }
}

/// JSON request body.
///
/// Same as [`axum::Json`], but a missing content type, malformed JSON or a
/// body of the wrong shape is answered with a 400 in the usual
/// `{ success: false, code, message }` form.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(&rejection)),
        }
    }
}

fn json_rejection(rejection: &JsonRejection) -> AppError {
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected a JSON body with Content-Type: application/json".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON".to_string(),
        other => other.body_text(),
    };
    AppError::bad_request(message)
}
