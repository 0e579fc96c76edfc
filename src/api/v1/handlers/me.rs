/*
 * Responsibility
 * - GET /me: 認証済み principal の確認用
 */
use axum::Json;

use crate::api::v1::{dto::me::MeResponse, extractors::Principal};

pub async fn me(Principal(principal): Principal) -> Json<MeResponse> {
    Json(MeResponse::from(&principal))
}
