/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - authenticator: API key → principal の解決
 *   - provider_key: この firewall の key
 *   - responder: error → HAL+JSON
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::services::auth::{ApiKeyAuthenticator, UserProvider};
use crate::services::errors::ErrorResponder;

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<ApiKeyAuthenticator>,
    pub provider_key: Arc<str>,
    pub responder: Arc<ErrorResponder>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserProvider>,
        provider_key: &str,
        responder: ErrorResponder,
    ) -> Self {
        Self {
            authenticator: Arc::new(ApiKeyAuthenticator::new(users)),
            provider_key: Arc::from(provider_key),
            responder: Arc::new(responder),
        }
    }
}
