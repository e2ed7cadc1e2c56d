use sqlx::Row;
use uuid::Uuid;

use crate::db::{now_iso, Database, DbError};

pub struct SessionRecord {
    pub user_id: String,
    pub expires_at: String,
}

pub async fn insert_session(
    db: &Database,
    user_id: &str,
    token_hash: &str,
    expires_at: &str,
) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO "sessions" ("id", "userId", "token", "expiresAt", "createdAt")
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .bind(now_iso())
    .execute(db.pool())
    .await?;
    Ok(())
}

pub async fn find_session(
    db: &Database,
    token_hash: &str,
) -> Result<Option<SessionRecord>, DbError> {
    let row = sqlx::query(r#"SELECT "userId", "expiresAt" FROM "sessions" WHERE "token" = $1"#)
        .bind(token_hash)
        .fetch_optional(db.pool())
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(SessionRecord {
        user_id: row.try_get("userId")?,
        expires_at: row.try_get("expiresAt")?,
    }))
}

pub async fn delete_session_by_token_hash(db: &Database, token_hash: &str) -> Result<(), DbError> {
    sqlx::query(r#"DELETE FROM "sessions" WHERE "token" = $1"#)
        .bind(token_hash)
        .execute(db.pool())
        .await?;
    Ok(())
}

pub async fn delete_user_sessions(db: &Database, user_id: &str) -> Result<u64, DbError> {
    let result = sqlx::query(r#"DELETE FROM "sessions" WHERE "userId" = $1"#)
        .bind(user_id)
        .execute(db.pool())
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_expired_sessions(db: &Database, now_iso: &str) -> Result<u64, DbError> {
    let result = sqlx::query(r#"DELETE FROM "sessions" WHERE "expiresAt" < $1"#)
        .bind(now_iso)
        .execute(db.pool())
        .await?;
    Ok(result.rows_affected())
}
