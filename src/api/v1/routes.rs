/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は認証なし、それ以外は API key 認証 (route_layer) の内側
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, me::me};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/me", get(me));
    let protected = middleware::auth::api_key::apply(protected, state);

    Router::new()
        .route("/health", get(health))
        .merge(protected)
}
