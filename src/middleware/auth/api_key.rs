//! API key 認証 → SecurityToken を extensions に入れる
//!
//! Flow (per request):
//! - extensions に同じ provider key 向けの認証済み token があればそのまま通す
//! - 同じ provider key 向けの未検証 token があれば、それを解決する
//! - どちらもなければ `X-API-App-Secret` / `X-API-Key` から token を作り、UserProvider で解決する
//! - 失敗は AppError として返し、error responder layer が描画する

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::SecurityToken;
use crate::state::AppState;

/// 認証が必要な routes に API key 認証を掛ける。
///
/// `route_layer` なので、存在しない path は 401 ではなく 404 になる。
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state, api_key_middleware))
}

async fn api_key_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provider_key = state.provider_key.as_ref();
    let authenticator = &state.authenticator;

    let existing = req
        .extensions()
        .get::<SecurityToken>()
        .filter(|token| authenticator.supports_token(token, provider_key))
        .cloned();

    let token = match existing {
        Some(SecurityToken::Authenticated(_)) => return Ok(next.run(req).await),
        // 上流 (gateway 等) が置いた未検証 token は header より優先
        Some(SecurityToken::PreAuthenticated(token)) => token,
        None => authenticator.create_token(req.headers(), provider_key)?,
    };

    let principal = authenticator.authenticate_token(&token, provider_key).await?;

    tracing::debug!(
        username = %principal.username(),
        provider_key,
        "api key authenticated"
    );

    // middleware → extractor への受け渡し
    req.extensions_mut()
        .insert(SecurityToken::Authenticated(principal));

    Ok(next.run(req).await)
}
