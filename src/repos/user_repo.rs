/*
 * Responsibility
 * - users / apps / "apiKeys" テーブル向け SQLx 操作 (read only)
 * - API key は digest (sha256 hex) で照合する。生の key は DB に置かない
 *
 * Schema (abridged)
 *   apps      ("appId" uuid, "appSecret" text)
 *   users     ("userId" uuid, "userName" text unique, roles text[])
 *   "apiKeys" ("appId" uuid, "userId" uuid, "keyHash" text)
 */
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoResult;

#[derive(Debug, FromRow)]
pub struct UserRow {
    #[sqlx(rename = "userId")]
    pub id: Uuid,
    #[sqlx(rename = "userName")]
    pub user_name: String,
    pub roles: Vec<String>,
}

pub async fn find_username_by_credentials(
    db: &PgPool,
    app_secret: &str,
    key_hash: &str,
) -> RepoResult<Option<String>> {
    let user_name = sqlx::query_scalar::<_, String>(
        r#"
        SELECT u."userName"
        FROM "apiKeys" k
        JOIN apps a ON a."appId" = k."appId"
        JOIN users u ON u."userId" = k."userId"
        WHERE a."appSecret" = $1 AND k."keyHash" = $2
        LIMIT 1
        "#,
    )
    .bind(app_secret)
    .bind(key_hash)
    .fetch_optional(db)
    .await?;

    Ok(user_name)
}

pub async fn find_by_username(db: &PgPool, user_name: &str) -> RepoResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT "userId", "userName", roles
        FROM users
        WHERE "userName" = $1
        "#,
    )
    .bind(user_name)
    .fetch_optional(db)
    .await?;

    Ok(row)
}
