/*
 * Responsibility
 * - security context に載る token の型 (契約)
 * - PreAuthenticatedToken: 未検証の credential + provider key
 * - AuthenticatedPrincipal: 解決済みの User + roles
 * - supports_token: provider key の一致判定 (security context には pre-authenticated な token しか載らない)
 */
use std::{collections::BTreeSet, fmt};

use crate::services::auth::credentials::UnauthenticatedCredential;
use crate::services::auth::provider::User;

/// Raw credentials wrapped for one provider key. Never trusted.
#[derive(Debug, Clone)]
pub struct PreAuthenticatedToken {
    credential: UnauthenticatedCredential,
    provider_key: String,
}

impl PreAuthenticatedToken {
    pub fn new(credential: UnauthenticatedCredential, provider_key: impl Into<String>) -> Self {
        Self {
            credential,
            provider_key: provider_key.into(),
        }
    }

    pub fn credential(&self) -> &UnauthenticatedCredential {
        &self.credential
    }

    pub fn provider_key(&self) -> &str {
        &self.provider_key
    }
}

#[derive(Clone)]
pub struct AuthenticatedPrincipal {
    user: User,
    credentials: String,
    roles: BTreeSet<String>,
    provider_key: String,
}

impl AuthenticatedPrincipal {
    pub fn new(user: User, api_key: impl Into<String>, provider_key: impl Into<String>) -> Self {
        let roles = user.roles.clone();
        Self {
            user,
            credentials: api_key.into(),
            roles,
            provider_key: provider_key.into(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// The API key the principal authenticated with.
    pub fn credentials(&self) -> &str {
        &self.credentials
    }

    pub fn provider_key(&self) -> &str {
        &self.provider_key
    }
}

impl fmt::Debug for AuthenticatedPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedPrincipal")
            .field("user", &self.user)
            .field("credentials", &"[REDACTED]")
            .field("roles", &self.roles)
            .field("provider_key", &self.provider_key)
            .finish()
    }
}

/// Per-request security context, stored in request extensions.
///
/// Only pre-authenticated tokens live here, raw or resolved. A request
/// without the extension is anonymous.
#[derive(Debug, Clone)]
pub enum SecurityToken {
    PreAuthenticated(PreAuthenticatedToken),
    Authenticated(AuthenticatedPrincipal),
}

impl SecurityToken {
    pub fn provider_key(&self) -> &str {
        match self {
            Self::PreAuthenticated(token) => token.provider_key(),
            Self::Authenticated(principal) => principal.provider_key(),
        }
    }

    pub fn principal(&self) -> Option<&AuthenticatedPrincipal> {
        match self {
            Self::Authenticated(principal) => Some(principal),
            Self::PreAuthenticated(_) => None,
        }
    }
}

/// Exact, case-sensitive comparison of provider keys.
pub fn supports_token(token: &SecurityToken, provider_key: &str) -> bool {
    token.provider_key() == provider_key
}
