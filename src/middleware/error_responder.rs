//! Global error rendering.
//!
//! Any response that carries an `AppError` in its extensions (handlers,
//! extractors, auth middleware, the panic and timeout guards) is replaced by
//! the responder's HAL+JSON rendering.
//!
//! Error responses built by axum or tower-http themselves (405 from the
//! method router, 413 from the body limit, extractor rejections) carry no
//! `AppError`. They are converted into an `HttpError` with the same status
//! so the client still gets an envelope and the error is logged once.
//! Successful responses pass through untouched.
//!
//! Apply this outside `http::guard` so panics, timeouts and the body limit
//! are rendered too.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::{Method, StatusCode, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::errors::ErrorResponder;

pub fn apply(router: Router, responder: Arc<ErrorResponder>) -> Router {
    router.layer(middleware::from_fn_with_state(responder, render_errors))
}

async fn render_errors(
    State(responder): State<Arc<ErrorResponder>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let mut response = next.run(req).await;

    if let Some(error) = response.extensions_mut().remove::<AppError>() {
        return responder.respond(error);
    }

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return responder.respond(bare_error(&method, &path, &response));
    }

    response
}

/// `HttpError` for an error response that was not built from an `AppError`.
fn bare_error(method: &Method, path: &str, response: &Response) -> AppError {
    let status = response.status();
    let reason = status.canonical_reason().unwrap_or("Error");

    match response.headers().get(header::ALLOW) {
        Some(allow) if status == StatusCode::METHOD_NOT_ALLOWED => {
            let allowed = allow.to_str().unwrap_or_default();
            AppError::http(
                status,
                format!("No route found for \"{method} {path}\": {reason} (Allow: {allowed})."),
            )
            .with_header(header::ALLOW, allow.clone())
        }
        _ => AppError::http(status, reason),
    }
}
