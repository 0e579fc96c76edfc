/*
 * Responsibility
 * - AppError → 最終 Response (HAL+JSON)
 *   - HTTP-aware: error 自身の status + headers
 *   - それ以外: 500, headers なし
 * - 1 error につき 1 行の diagnostic log
 * - 描画中の失敗 (panic 含む) は固定の 500 body に落とす。ここ自体は失敗しない
 */
use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::error::AppError;
use crate::services::errors::{
    envelope::{DefaultErrorWrapper, ErrorWrapper},
    log::{ErrorLog, TracingErrorLog},
};

pub const HAL_JSON: &str = "application/hal+json";

const FALLBACK_BODY: &str = r#"{"message":"Internal Server Error","code":500}"#;

#[derive(Debug, Error)]
enum RenderError {
    #[error("envelope serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("response build failed: {0}")]
    Response(#[from] axum::http::Error),
}

pub struct ErrorResponder {
    wrapper: Arc<dyn ErrorWrapper>,
    log: Arc<dyn ErrorLog>,
}

impl ErrorResponder {
    pub fn new(wrapper: Arc<dyn ErrorWrapper>, log: Arc<dyn ErrorLog>) -> Self {
        Self { wrapper, log }
    }

    /// Default wrapper + `tracing` as the log sink.
    pub fn with_tracing(expose_details: bool) -> Self {
        Self::new(
            Arc::new(DefaultErrorWrapper::new(expose_details)),
            Arc::new(TracingErrorLog),
        )
    }

    pub fn respond(&self, error: AppError) -> Response {
        let response = match panic::catch_unwind(AssertUnwindSafe(|| self.render(&error))) {
            Ok(Ok(response)) => response,
            Ok(Err(_)) | Err(_) => fallback_response(),
        };

        self.log.error(&diagnostic_line(&error));
        response
    }

    fn render(&self, error: &AppError) -> Result<Response, RenderError> {
        let envelope = self.wrapper.wrap(error);
        let body = serde_json::to_vec(&envelope)?;

        let mut response = axum::http::Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::from(body))?;

        if let Some((status, headers)) = error.http_status() {
            *response.status_mut() = status;
            response.headers_mut().extend(headers);
        }

        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(HAL_JSON));

        Ok(response)
    }
}

impl fmt::Debug for ErrorResponder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorResponder").finish_non_exhaustive()
    }
}

/// `"<Kind>" with message "<message>" on line <line> in <file>.`
pub fn diagnostic_line(error: &AppError) -> String {
    let location = error.location();
    format!(
        "\"{}\" with message \"{}\" on line {} in {}.",
        error.kind(),
        error,
        location.line,
        location.file
    )
}

fn fallback_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, HAL_JSON)],
        FALLBACK_BODY,
    )
        .into_response()
}
