/*
 * Responsibility
 * - アプリ共通の AppError 定義 (closed set of error kinds)
 * - HTTP-aware かどうか (status + headers) を tag で判定する
 * - IntoResponse: responder layer が描画できるよう extensions に自身を載せる
 */
use std::{any::Any, borrow::Cow, panic::Location};

use axum::{
    Json,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::credentials::CredentialHeader;
use crate::services::auth::provider::UserLookupError;

/// Where an error was raised. Empty for errors whose origin is unknown (panics).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("No API {header} found.")]
    MissingCredentials {
        header: CredentialHeader,
        location: SourceLocation,
    },
    #[error("API Key \"{api_key}\" does not exist.")]
    UnknownApiKey {
        api_key: String,
        location: SourceLocation,
    },
    #[error("{message}")]
    Http {
        status: StatusCode,
        message: String,
        headers: HeaderMap,
        location: SourceLocation,
    },
    #[error("{message}")]
    Unclassified {
        kind: Cow<'static, str>,
        message: String,
        location: SourceLocation,
    },
}

impl AppError {
    #[track_caller]
    pub fn missing_credentials(header: CredentialHeader) -> Self {
        Self::MissingCredentials {
            header,
            location: SourceLocation::caller(),
        }
    }

    #[track_caller]
    pub fn unknown_api_key(api_key: impl Into<String>) -> Self {
        Self::UnknownApiKey {
            api_key: api_key.into(),
            location: SourceLocation::caller(),
        }
    }

    #[track_caller]
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            headers: HeaderMap::new(),
            location: SourceLocation::caller(),
        }
    }

    #[track_caller]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::http(StatusCode::UNAUTHORIZED, message)
    }

    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::http(StatusCode::NOT_FOUND, message)
    }

    #[track_caller]
    pub fn unclassified(kind: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self::Unclassified {
            kind: kind.into(),
            message: message.into(),
            location: SourceLocation::caller(),
        }
    }

    /// Converts a panic payload caught by the panic layer.
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with a non-string payload".to_string()
        };

        Self::Unclassified {
            kind: Cow::Borrowed("PanicError"),
            message,
            location: SourceLocation::default(),
        }
    }

    /// Adds a response header. Only HTTP-aware errors carry headers; others ignore it.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        if let Self::Http { headers, .. } = &mut self {
            headers.insert(name, value);
        }
        self
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::MissingCredentials { .. } => "MissingCredentialsError",
            Self::UnknownApiKey { .. } => "UnknownApiKeyError",
            Self::Http { .. } => "HttpError",
            Self::Unclassified { kind, .. } => kind.as_ref(),
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            Self::MissingCredentials { location, .. }
            | Self::UnknownApiKey { location, .. }
            | Self::Http { location, .. }
            | Self::Unclassified { location, .. } => *location,
        }
    }

    /// Status and headers declared by the error itself.
    /// `None` means the error is unclassified and has no HTTP meaning.
    pub fn http_status(&self) -> Option<(StatusCode, HeaderMap)> {
        match self {
            Self::MissingCredentials { .. } | Self::UnknownApiKey { .. } => {
                Some((StatusCode::UNAUTHORIZED, HeaderMap::new()))
            }
            Self::Http {
                status, headers, ..
            } => Some((*status, headers.clone())),
            Self::Unclassified { .. } => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.http_status()
            .map_or(StatusCode::INTERNAL_SERVER_ERROR, |(status, _)| status)
    }

    /// Message safe to hand to clients. The raw API key stays in the log line only.
    pub fn public_message(&self) -> String {
        match self {
            Self::UnknownApiKey { .. } => "API key does not exist.".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PlaceholderBody {
    message: &'static str,
    code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The responder layer replaces this; without it the client still gets JSON.
        let status = self.status();
        let body = PlaceholderBody {
            message: status.canonical_reason().unwrap_or("Error"),
            code: status.as_u16(),
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl From<RepoError> for AppError {
    #[track_caller]
    fn from(e: RepoError) -> Self {
        AppError::unclassified("RepoError", e.to_string())
    }
}

impl From<UserLookupError> for AppError {
    #[track_caller]
    fn from(e: UserLookupError) -> Self {
        AppError::unclassified("UserLookupError", e.to_string())
    }
}
