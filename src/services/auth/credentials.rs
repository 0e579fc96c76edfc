//! Raw credential extraction from request headers.
//!
//! Two fixed headers carry the credential pair:
//! - `X-API-App-Secret`: the application secret
//! - `X-API-Key`: the per-user API key
//!
//! Nothing here is trusted yet; the values are handed to the authenticator as-is.

use std::fmt;

use axum::http::{HeaderMap, HeaderName};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialHeader {
    AppSecret,
    ApiKey,
}

impl CredentialHeader {
    pub fn header_name(self) -> HeaderName {
        match self {
            Self::AppSecret => HeaderName::from_static("x-api-app-secret"),
            Self::ApiKey => HeaderName::from_static("x-api-key"),
        }
    }
}

impl fmt::Display for CredentialHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AppSecret => write!(f, "app secret"),
            Self::ApiKey => write!(f, "key"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct UnauthenticatedCredential {
    app_secret: String,
    api_key: String,
}

impl UnauthenticatedCredential {
    pub fn new(app_secret: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            app_secret: app_secret.into(),
            api_key: api_key.into(),
        }
    }

    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for UnauthenticatedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnauthenticatedCredential")
            .field("app_secret", &"[REDACTED]")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Reads both credential headers. The app secret is checked first.
pub fn extract(headers: &HeaderMap) -> Result<UnauthenticatedCredential, AppError> {
    let app_secret = required(headers, CredentialHeader::AppSecret)?;
    let api_key = required(headers, CredentialHeader::ApiKey)?;

    Ok(UnauthenticatedCredential {
        app_secret,
        api_key,
    })
}

// Missing, empty and non-UTF-8 values are all treated as absent.
fn required(headers: &HeaderMap, header: CredentialHeader) -> Result<String, AppError> {
    let value = headers
        .get(header.header_name())
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    match value {
        Some(v) => Ok(v.to_owned()),
        None => Err(AppError::missing_credentials(header)),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(*value));
        }
        headers
    }

    fn missing_header(result: Result<UnauthenticatedCredential, AppError>) -> CredentialHeader {
        match result {
            Err(AppError::MissingCredentials { header, .. }) => header,
            other => panic!("expected MissingCredentials, got {other:?}"),
        }
    }

    #[test]
    fn extracts_both_values_unmodified() {
        let h = headers(&[("x-api-app-secret", " s1 "), ("x-api-key", "K1")]);
        let credential = extract(&h).unwrap();
        assert_eq!(credential.app_secret(), " s1 ");
        assert_eq!(credential.api_key(), "K1");
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let mut h = HeaderMap::new();
        h.insert(
            HeaderName::from_bytes(b"X-API-App-Secret").unwrap(),
            HeaderValue::from_static("s1"),
        );
        h.insert(
            HeaderName::from_bytes(b"X-Api-KEY").unwrap(),
            HeaderValue::from_static("k1"),
        );
        assert_eq!(extract(&h).unwrap(), UnauthenticatedCredential::new("s1", "k1"));
    }

    #[test]
    fn missing_app_secret_is_reported_first() {
        assert_eq!(
            missing_header(extract(&HeaderMap::new())),
            CredentialHeader::AppSecret
        );
        assert_eq!(
            missing_header(extract(&headers(&[("x-api-key", "k1")]))),
            CredentialHeader::AppSecret
        );
    }

    #[test]
    fn missing_or_empty_api_key_fails() {
        let h = headers(&[("x-api-app-secret", "s1")]);
        assert_eq!(missing_header(extract(&h)), CredentialHeader::ApiKey);

        let h = headers(&[("x-api-app-secret", "s1"), ("x-api-key", "")]);
        assert_eq!(missing_header(extract(&h)), CredentialHeader::ApiKey);
    }

    #[test]
    fn empty_app_secret_fails() {
        let h = headers(&[("x-api-app-secret", ""), ("x-api-key", "k1")]);
        assert_eq!(missing_header(extract(&h)), CredentialHeader::AppSecret);
    }

    #[test]
    fn non_utf8_value_counts_as_missing() {
        let mut h = headers(&[("x-api-app-secret", "s1")]);
        h.insert("x-api-key", HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());
        assert_eq!(missing_header(extract(&h)), CredentialHeader::ApiKey);
    }

    #[test]
    fn debug_output_redacts_values() {
        let rendered = format!("{:?}", UnauthenticatedCredential::new("s1", "k1"));
        assert!(!rendered.contains("s1"));
        assert!(!rendered.contains("k1"));
    }
}
