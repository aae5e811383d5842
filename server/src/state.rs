//! Application state for the HTTP server.

use axum::extract::FromRef;
use eventform_intake::IntakeService;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; cloning only bumps a reference count.
pub struct AppState<C, S> {
    /// The intake pipeline.
    pub intake: Arc<IntakeService<C, S>>,
}

impl<C, S> AppState<C, S> {
    /// Wrap a pipeline.
    #[must_use]
    pub fn new(intake: IntakeService<C, S>) -> Self {
        Self {
            intake: Arc::new(intake),
        }
    }
}

impl<C, S> Clone for AppState<C, S> {
    fn clone(&self) -> Self {
        Self {
            intake: Arc::clone(&self.intake),
        }
    }
}

/// Lets generic handlers such as the readiness probe take the pipeline directly.
impl<C, S> FromRef<AppState<C, S>> for Arc<IntakeService<C, S>> {
    fn from_ref(state: &AppState<C, S>) -> Self {
        Arc::clone(&state.intake)
    }
}
