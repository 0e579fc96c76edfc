//! HTTP-level middleware (cross-cutting concerns).
//!
//! Two groups, applied at different depths by `app.rs`:
//!
//! `guard` (inside the error responder, so its failures are rendered as envelopes):
//! - Body size limit: 413
//! - Panic catching: a panicking handler becomes a `PanicError` (500)
//! - Global timeout: 408 `HttpError`
//!
//! `apply` (outermost, so it also decorates error responses):
//! - Request-Id generation + propagation (X-Request-Id)
//! - Access logging / request tracing (TraceLayer)
//! - `X-Content-Type-Options: nosniff`

use std::{any::Any, time::Duration};

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{
    StatusCode,
    header::{HeaderName, HeaderValue},
};
use axum::response::{IntoResponse, Response};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Body limit, panic and timeout guards. Their failures are rendered by the error responder.
pub fn guard(router: Router) -> Router {
    let layers = ServiceBuilder::new()
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        // Make the service error `Infallible` by converting errors into AppError.
        .layer(HandleErrorLayer::new(handle_service_error))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CatchPanicLayer::custom(panic_response));

    router.layer(layers)
}

/// Request id, tracing and nosniff.
pub fn apply(router: Router) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    let layers = ServiceBuilder::new()
        // Generate a request id if missing, then propagate it to the response.
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ));

    router.layer(layers)
}

async fn handle_service_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::http(StatusCode::REQUEST_TIMEOUT, "Request timed out.")
    } else {
        AppError::unclassified("ServiceError", err.to_string())
    }
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    AppError::from_panic(payload).into_response()
}
