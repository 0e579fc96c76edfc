/*
 * Responsibility
 * - middleware の公開インターフェース
 * - 各 module は `apply(router, ...)` を公開し、app.rs は順番に積むだけ
 */
pub mod auth;
pub mod cors;
pub mod error_responder;
pub mod http;
