/*
 * Responsibility
 * - API key による pre-authentication
 *   - create_token: header → PreAuthenticatedToken (未検証)
 *   - authenticate_token: UserProvider で解決 → AuthenticatedPrincipal
 *   - supports_token: provider key が一致する pre-authenticated token か
 * - lookup の失敗は retry しない (認証失敗として確定)
 */
use std::sync::Arc;

use axum::http::HeaderMap;

use crate::error::AppError;
use crate::services::auth::{
    credentials,
    provider::{UserLookupError, UserProvider},
    token::{self, AuthenticatedPrincipal, PreAuthenticatedToken, SecurityToken},
};

#[derive(Clone)]
pub struct ApiKeyAuthenticator {
    users: Arc<dyn UserProvider>,
}

impl ApiKeyAuthenticator {
    pub fn new(users: Arc<dyn UserProvider>) -> Self {
        Self { users }
    }

    pub fn create_token(
        &self,
        headers: &HeaderMap,
        provider_key: &str,
    ) -> Result<PreAuthenticatedToken, AppError> {
        let credential = credentials::extract(headers)?;
        Ok(PreAuthenticatedToken::new(credential, provider_key))
    }

    pub async fn authenticate_token(
        &self,
        token: &PreAuthenticatedToken,
        provider_key: &str,
    ) -> Result<AuthenticatedPrincipal, AppError> {
        let credential = token.credential();

        let username = match self
            .users
            .resolve_username(credential.app_secret(), credential.api_key())
            .await?
        {
            Some(username) => username,
            None => return Err(AppError::unknown_api_key(credential.api_key())),
        };

        // A key whose user has since disappeared is an unknown key, not a server fault.
        let user = match self.users.load_user_by_username(&username).await {
            Ok(user) => user,
            Err(UserLookupError::NotFound(_)) => {
                tracing::warn!(%username, "api key resolved to a user that no longer exists");
                return Err(AppError::unknown_api_key(credential.api_key()));
            }
            Err(err) => return Err(err.into()),
        };

        Ok(AuthenticatedPrincipal::new(
            user,
            credential.api_key(),
            provider_key,
        ))
    }

    pub fn supports_token(&self, token: &SecurityToken, provider_key: &str) -> bool {
        token::supports_token(token, provider_key)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use uuid::Uuid;

    use super::*;
    use crate::repos::error::RepoError;
    use crate::services::auth::credentials::UnauthenticatedCredential;
    use crate::services::auth::provider::{InMemoryUserProvider, User};

    struct BrokenProvider;

    #[async_trait]
    impl UserProvider for BrokenProvider {
        async fn resolve_username(
            &self,
            _app_secret: &str,
            _api_key: &str,
        ) -> Result<Option<String>, UserLookupError> {
            Err(UserLookupError::Repo(RepoError::Db(sqlx::Error::PoolTimedOut)))
        }

        async fn load_user_by_username(&self, username: &str) -> Result<User, UserLookupError> {
            Err(UserLookupError::NotFound(username.to_owned()))
        }
    }

    fn authenticator() -> ApiKeyAuthenticator {
        let users = InMemoryUserProvider::new()
            .with_user(User::new(Uuid::new_v4(), "alice", ["ROLE_USER"]))
            .with_user(User::new(Uuid::new_v4(), "bob", ["ROLE_USER", "ROLE_ADMIN"]))
            .with_api_key("s1", "k1", "alice")
            .with_api_key("s1", "k2", "bob")
            .with_api_key("s1", "k-orphan", "carol");
        ApiKeyAuthenticator::new(Arc::new(users))
    }

    fn token(app_secret: &str, api_key: &str) -> PreAuthenticatedToken {
        PreAuthenticatedToken::new(UnauthenticatedCredential::new(app_secret, api_key), "api")
    }

    #[test]
    fn create_token_wraps_headers_for_the_provider_key() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-app-secret", HeaderValue::from_static("s1"));
        headers.insert("x-api-key", HeaderValue::from_static("k1"));

        let token = authenticator().create_token(&headers, "api").unwrap();
        assert_eq!(token.provider_key(), "api");
        assert_eq!(token.credential().app_secret(), "s1");
        assert_eq!(token.credential().api_key(), "k1");
    }

    #[test]
    fn create_token_fails_without_headers() {
        let err = authenticator()
            .create_token(&HeaderMap::new(), "api")
            .unwrap_err();
        assert_eq!(err.kind(), "MissingCredentialsError");
    }

    #[tokio::test]
    async fn resolves_principal_with_the_users_roles() {
        let principal = authenticator()
            .authenticate_token(&token("s1", "k2"), "api")
            .await
            .unwrap();

        assert_eq!(principal.username(), "bob");
        let roles: Vec<&str> = principal.roles().iter().map(String::as_str).collect();
        assert_eq!(roles, vec!["ROLE_ADMIN", "ROLE_USER"]);
        assert_eq!(principal.credentials(), "k2");
        assert_eq!(principal.provider_key(), "api");
    }

    #[tokio::test]
    async fn unknown_pair_is_rejected() {
        let err = authenticator()
            .authenticate_token(&token("s2", "k1"), "api")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "UnknownApiKeyError");
        assert_eq!(err.to_string(), "API Key \"k1\" does not exist.");
        assert!(err.location().file.ends_with("authenticator.rs"));
    }

    #[tokio::test]
    async fn vanished_user_is_treated_as_unknown_key() {
        let err = authenticator()
            .authenticate_token(&token("s1", "k-orphan"), "api")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "UnknownApiKeyError");
    }

    #[tokio::test]
    async fn backend_failures_are_unclassified() {
        let authenticator = ApiKeyAuthenticator::new(Arc::new(BrokenProvider));
        let err = authenticator
            .authenticate_token(&token("s1", "k1"), "api")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "UserLookupError");
        assert!(err.http_status().is_none());
    }

    #[test]
    fn supports_token_delegates_to_the_provider_key_check() {
        let authenticator = authenticator();
        let raw = SecurityToken::PreAuthenticated(token("s1", "k1"));
        assert!(authenticator.supports_token(&raw, "api"));
        assert!(!authenticator.supports_token(&raw, "Api"));
    }
}
