use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::db::{now_iso, Database, DbError};

pub struct ResetTokenRecord {
    pub id: String,
    pub user_id: String,
}

pub async fn create_token(
    db: &Database,
    user_id: &str,
    token_hash: &str,
    expires_at: &str,
) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO "password_reset_tokens" ("id", "userId", "tokenHash", "expiresAt", "used", "createdAt")
        VALUES ($1, $2, $3, $4, 0, $5)
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

pub async fn last_request_time(
    db: &Database,
    user_id: &str,
) -> Result<Option<DateTime<Utc>>, DbError> {
    let created: Option<String> = sqlx::query_scalar(
        r#"SELECT MAX("createdAt") FROM "password_reset_tokens" WHERE "userId" = $1"#,
    )
    .bind(user_id)
    .fetch_one(db.pool())
    .await?;

    Ok(created
        .as_deref()
        .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|value| value.with_timezone(&Utc)))
}

pub async fn invalidate_user_tokens(db: &Database, user_id: &str) -> Result<(), DbError> {
    sqlx::query(r#"UPDATE "password_reset_tokens" SET "used" = 1 WHERE "userId" = $1 AND "used" = 0"#)
        .bind(user_id)
        .execute(db.pool())
        .await?;
    Ok(())
}

pub async fn find_valid_token(
    db: &Database,
    token_hash: &str,
    now_iso: &str,
) -> Result<Option<ResetTokenRecord>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT "id", "userId" FROM "password_reset_tokens"
        WHERE "tokenHash" = $1 AND "used" = 0 AND "expiresAt" > $2
        "#,
    )
    .bind(token_hash)
    .bind(now_iso)
    .fetch_optional(db.pool())
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(ResetTokenRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("userId")?,
    }))
}

pub async fn mark_used(db: &Database, id: &str) -> Result<(), DbError> {
    sqlx::query(r#"UPDATE "password_reset_tokens" SET "used" = 1 WHERE "id" = $1"#)
        .bind(id)
        .execute(db.pool())
        .await?;
    Ok(())
}

pub async fn delete_stale_tokens(db: &Database, now_iso: &str) -> Result<u64, DbError> {
    let result = sqlx::query(
        r#"DELETE FROM "password_reset_tokens" WHERE "expiresAt" < $1 OR "used" = 1"#,
    )
    .bind(now_iso)
    .execute(db.pool())
    .await?;
    Ok(result.rows_affected())
}
