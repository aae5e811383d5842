//! Health check endpoints.
//!
//! Used by load balancers and orchestrators to decide whether to route
//! traffic to this instance.

use crate::error::AppError;
use crate::response::ApiResponse;
use axum::extract::State;
use eventform_core::providers::Readiness;
use std::sync::Arc;

/// Liveness probe.
///
/// Does NOT check dependencies.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// { "success": true, "message": "ok" }
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> ApiResponse<()> {
    ApiResponse::empty().with_message("ok")
}

/// Readiness probe.
///
/// Round-trips to every backing service behind `R`.
///
/// # Status Codes
///
/// - 200 OK: every dependency answered
/// - 503 Service Unavailable: at least one did not
///
/// # Endpoint
///
/// ```text
/// GET /health/ready
/// ```
///
/// # Errors
///
/// Returns [`AppError::unavailable`] with a fixed message; the cause is
/// only logged.
pub async fn readiness_check<R: Readiness>(
    State(probe): State<Arc<R>>,
) -> Result<ApiResponse<()>, AppError> {
    match probe.check_ready().await {
        Ok(()) => Ok(ApiResponse::empty().with_message("ready")),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            Err(AppError::unavailable("Service not ready"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use eventform_testing::MockCache;

    #[tokio::test]
    async fn liveness_is_always_ok() {
        let response = health_check().await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_follows_dependency() {
        let cache = Arc::new(MockCache::new());

        let ready = readiness_check(State(Arc::clone(&cache))).await;
        assert!(ready.is_ok());

        cache.set_failing(true);
        let not_ready = readiness_check(State(cache)).await.unwrap_err();
        let response = not_ready.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], "Service not ready");
    }
}
