/*!
 * Request extractors
 *
 * Public API:
 * - Principal: 認証済み principal (middleware が SecurityToken を extensions に入れている前提)
 */
mod principal;

pub use principal::Principal;
