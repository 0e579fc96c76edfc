use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub message: String,
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<Diagnostics>,
}

/// Where the error came from. Only emitted outside production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub kind: String,
    pub file: String,
    pub line: u32,
}

/// Turns an error into something safe to serialize for the client.
pub trait ErrorWrapper: Send + Sync {
    fn wrap(&self, error: &AppError) -> ErrorEnvelope;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorWrapper {
    expose_details: bool,
}

impl DefaultErrorWrapper {
    pub fn new(expose_details: bool) -> Self {
        Self { expose_details }
    }
}

impl ErrorWrapper for DefaultErrorWrapper {
    fn wrap(&self, error: &AppError) -> ErrorEnvelope {
        let status = error.status();

        let message = match error {
            AppError::Unclassified { .. } if !self.expose_details => status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string(),
            other => other.public_message(),
        };

        let debug = self.expose_details.then(|| {
            let location = error.location();
            Diagnostics {
                kind: error.kind().to_string(),
                file: location.file.to_string(),
                line: location.line,
            }
        });

        ErrorEnvelope {
            message,
            code: status.as_u16(),
            debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn production_hides_unclassified_messages() {
        let envelope = DefaultErrorWrapper::new(false)
            .wrap(&AppError::unclassified("RepoError", "connection refused"));
        assert_eq!(envelope.message, "Internal Server Error");
        assert_eq!(envelope.code, 500);
        assert!(envelope.debug.is_none());
    }

    #[test]
    fn http_errors_keep_their_message_in_production() {
        let envelope = DefaultErrorWrapper::new(false)
            .wrap(&AppError::http(StatusCode::NOT_FOUND, "No such widget."));
        assert_eq!(envelope.message, "No such widget.");
        assert_eq!(envelope.code, 404);
    }

    #[test]
    fn development_adds_diagnostics() {
        let envelope = DefaultErrorWrapper::new(true)
            .wrap(&AppError::unclassified("RepoError", "connection refused"));
        assert_eq!(envelope.message, "connection refused");
        let debug = envelope.debug.unwrap();
        assert_eq!(debug.kind, "RepoError");
        assert!(debug.file.ends_with("envelope.rs"));
        assert!(debug.line > 0);
    }

    #[test]
    fn raw_api_key_never_reaches_the_envelope() {
        for expose_details in [false, true] {
            let envelope =
                DefaultErrorWrapper::new(expose_details).wrap(&AppError::unknown_api_key("k-secret"));
            let json = serde_json::to_string(&envelope).unwrap();
            assert!(!json.contains("k-secret"), "leaked: {json}");
            assert_eq!(envelope.code, 401);
        }
    }

    #[test]
    fn debug_is_omitted_from_json_when_absent() {
        let envelope = ErrorEnvelope {
            message: "x".to_string(),
            code: 500,
            debug: None,
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, r#"{"message":"x","code":500}"#);
    }
}
