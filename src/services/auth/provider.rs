//! User lookup collaborator.
//!
//! The authenticator only needs two capabilities:
//! - map an (app secret, API key) pair to a username
//! - load the full user record for that username
//!
//! `PgUserProvider` is the production implementation. `InMemoryUserProvider`
//! is a substitute for tests and local runs.
use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::repos::{error::RepoError, user_repo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub roles: BTreeSet<String>,
}

impl User {
    pub fn new<I, R>(id: Uuid, username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            id,
            username: username.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<user_repo::UserRow> for User {
    fn from(row: user_repo::UserRow) -> Self {
        Self::new(row.id, row.user_name, row.roles)
    }
}

#[derive(Debug, Error)]
pub enum UserLookupError {
    #[error("user \"{0}\" not found")]
    NotFound(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[async_trait]
pub trait UserProvider: Send + Sync {
    // Returns `Ok(None)` when no user owns the pair.
    async fn resolve_username(
        &self,
        app_secret: &str,
        api_key: &str,
    ) -> Result<Option<String>, UserLookupError>;

    // Fails with `UserLookupError::NotFound` when the username is unknown.
    async fn load_user_by_username(&self, username: &str) -> Result<User, UserLookupError>;
}

/// API keys are stored as lowercase hex SHA-256 digests.
pub fn digest_api_key(api_key: &str) -> String {
    format!("{:x}", Sha256::digest(api_key.as_bytes()))
}

#[derive(Clone, Debug)]
pub struct PgUserProvider {
    db: PgPool,
}

impl PgUserProvider {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserProvider for PgUserProvider {
    async fn resolve_username(
        &self,
        app_secret: &str,
        api_key: &str,
    ) -> Result<Option<String>, UserLookupError> {
        let key_hash = digest_api_key(api_key);
        let username = user_repo::find_username_by_credentials(&self.db, app_secret, &key_hash).await?;
        Ok(username)
    }

    async fn load_user_by_username(&self, username: &str) -> Result<User, UserLookupError> {
        user_repo::find_by_username(&self.db, username)
            .await?
            .map(User::from)
            .ok_or_else(|| UserLookupError::NotFound(username.to_owned()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryUserProvider {
    // (app secret, key digest) -> username
    keys: HashMap<(String, String), String>,
    users: HashMap<String, User>,
}

impl InMemoryUserProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.username.clone(), user);
        self
    }

    /// The username does not have to exist; that models a user deleted after key issuance.
    pub fn with_api_key(
        mut self,
        app_secret: impl Into<String>,
        api_key: &str,
        username: impl Into<String>,
    ) -> Self {
        self.keys
            .insert((app_secret.into(), digest_api_key(api_key)), username.into());
        self
    }
}

#[async_trait]
impl UserProvider for InMemoryUserProvider {
    async fn resolve_username(
        &self,
        app_secret: &str,
        api_key: &str,
    ) -> Result<Option<String>, UserLookupError> {
        let key = (app_secret.to_owned(), digest_api_key(api_key));
        Ok(self.keys.get(&key).cloned())
    }

    async fn load_user_by_username(&self, username: &str) -> Result<User, UserLookupError> {
        self.users
            .get(username)
            .cloned()
            .ok_or_else(|| UserLookupError::NotFound(username.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_lowercase_hex_sha256() {
        assert_eq!(
            digest_api_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn in_memory_provider_resolves_exact_pairs() {
        let provider = InMemoryUserProvider::new()
            .with_user(User::new(Uuid::new_v4(), "alice", ["ROLE_USER"]))
            .with_api_key("s1", "k1", "alice");

        assert_eq!(
            provider.resolve_username("s1", "k1").await.unwrap(),
            Some("alice".to_string())
        );
        assert_eq!(provider.resolve_username("s1", "k2").await.unwrap(), None);
        assert_eq!(provider.resolve_username("s2", "k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn in_memory_provider_reports_unknown_users() {
        let provider = InMemoryUserProvider::new();
        let err = provider.load_user_by_username("ghost").await.unwrap_err();
        assert!(matches!(err, UserLookupError::NotFound(name) if name == "ghost"));
    }
}
