//! Request correlation.
//!
//! Every request gets a UUID: the one sent in `X-Correlation-ID` when it
//! parses, a fresh v4 otherwise. The id is stored in the request
//! extensions as a `Uuid` and recorded on an `http_request` span wrapping
//! the handler, so every log line of the request carries it. It is also
//! sent back in the response header.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/api/forms/:slug", get(public_form))
//!     .layer(correlation_id_layer());
//! ```

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Request and response header carrying the correlation id.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// The id a client sent, if it is a UUID.
fn correlation_id_from(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(CORRELATION_ID_HEADER)?
        .to_str()
        .ok()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
}

/// Tag every request with a correlation id.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationLayer {
    CorrelationLayer
}

/// [`Layer`] producing [`Correlated`] services.
#[derive(Clone, Copy, Debug, Default)]
pub struct CorrelationLayer;

impl<S> Layer<S> for CorrelationLayer {
    type Service = Correlated<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Correlated { inner }
    }
}

/// Wraps a service so each call runs under its request's correlation id.
#[derive(Clone, Debug)]
pub struct Correlated<S> {
    inner: S,
}

type BoxFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

impl<S> Service<Request> for Correlated<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<Response, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let id = correlation_id_from(request.headers()).unwrap_or_else(Uuid::new_v4);
        request.extensions_mut().insert(id);

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %id,
            method = %request.method(),
            path = %request.uri().path(),
        );
        let handled = self.inner.call(request).instrument(span);

        Box::pin(async move {
            let mut response = handled.await?;
            // A hyphenated UUID is always a valid header value.
            if let Ok(value) = HeaderValue::try_from(id.to_string()) {
                response.headers_mut().insert(CORRELATION_ID_HEADER, value);
            }
            Ok(response)
        })
    }
}
