/*
 * Responsibility
 * - handler から呼ばれるロジック (API key 認証 / error envelope の描画)
 */
pub mod auth;
pub mod errors;
