use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{AuthenticatedPrincipal, SecurityToken};

/// Handler で AuthenticatedPrincipal を受け取るための extractor
/// 見つからない場合は 401 (認証 middleware が掛かっていない route)
pub struct Principal(pub AuthenticatedPrincipal);

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts
            .extensions
            .get::<SecurityToken>()
            .and_then(SecurityToken::principal)
        {
            Some(principal) => Ok(Principal(principal.clone())),
            None => Err(AppError::unauthorized(
                "Full authentication is required to access this resource.",
            )),
        }
    }
}
