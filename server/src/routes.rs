//! Router configuration.

use crate::api::{admin, forms};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};
use eventform_core::providers::{DurableStore, KeyValueCache, Readiness};
use eventform_intake::IntakeService;
use eventform_web::correlation_id_layer;
use eventform_web::handlers::{health_check, readiness_check};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the complete router.
///
/// - `/health`, `/health/ready`: probes
/// - `/api/forms/...`: visitor endpoints
/// - `/api/admin/...`: organizer endpoints (unauthenticated)
pub fn build_router<C, S>(state: AppState<C, S>) -> Router
where
    C: KeyValueCache + Readiness + 'static,
    S: DurableStore + 'static,
{
    let visitor_routes = Router::new()
        .route("/forms/:slug", get(forms::public_form::<C, S>))
        .route("/forms/:slug/visit", post(forms::record_visit::<C, S>))
        .route("/forms/:slug/start", post(forms::start_submission::<C, S>))
        .route("/forms/:slug/submit", post(forms::submit::<C, S>))
        .route(
            "/forms/:slug/draft",
            get(forms::get_draft::<C, S>).post(forms::save_draft::<C, S>),
        );

    let admin_routes = Router::new()
        .route(
            "/admin/submissions/:id",
            get(admin::get_submission::<C, S>).delete(admin::delete_submission::<C, S>),
        )
        .route(
            "/admin/events/:id/submissions",
            get(admin::list_submissions::<C, S>),
        )
        .route(
            "/admin/events/:id/analytics",
            get(admin::event_analytics::<C, S>),
        )
        .route(
            "/admin/forms/:slug/cache",
            delete(admin::refresh_public_form::<C, S>),
        );

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/health/ready",
            get(readiness_check::<IntakeService<C, S>>),
        )
        .nest("/api", visitor_routes.merge(admin_routes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
