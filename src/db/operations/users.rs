use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::{now_iso, Database, DbError};
use crate::services::progress::next_streak;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub total_words: i64,
    pub learned_words: i64,
    pub streak: i64,
    pub last_activity: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub progress: UserProgress,
    pub created_at: String,
    pub updated_at: String,
}

pub struct UserWithPassword {
    pub profile: UserProfile,
    pub password_hash: String,
}

const USER_COLUMNS: &str = r#""id", "email", "displayName", "totalWords", "learnedWords", "streak", "lastActivity", "createdAt", "updatedAt""#;

fn map_user(row: &SqliteRow) -> Result<UserProfile, sqlx::Error> {
    Ok(UserProfile {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        display_name: row.try_get("displayName")?,
        progress: UserProgress {
            total_words: row.try_get("totalWords")?,
            learned_words: row.try_get("learnedWords")?,
            streak: row.try_get("streak")?,
            last_activity: row.try_get("lastActivity")?,
        },
        created_at: row.try_get("createdAt")?,
        updated_at: row.try_get("updatedAt")?,
    })
}

pub async fn insert_user(
    db: &Database,
    id: &str,
    email: &str,
    password_hash: &str,
    display_name: &str,
) -> Result<UserProfile, DbError> {
    let now = now_iso();
    sqlx::query(
        r#"
        INSERT INTO "users" ("id", "email", "passwordHash", "displayName", "lastActivity", "createdAt", "updatedAt")
        VALUES ($1, $2, $3, $4, $5, $5, $5)
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(display_name)
    .bind(&now)
    .execute(db.pool())
    .await?;

    get_user(db, id).await?.ok_or(DbError::NotFound("User"))
}

pub async fn email_exists(db: &Database, email: &str) -> Result<bool, DbError> {
    let found: Option<String> =
        sqlx::query_scalar(r#"SELECT "id" FROM "users" WHERE "email" = $1 LIMIT 1"#)
            .bind(email)
            .fetch_optional(db.pool())
            .await?;
    Ok(found.is_some())
}

pub async fn get_user(db: &Database, id: &str) -> Result<Option<UserProfile>, DbError> {
    let row = sqlx::query(&format!(
        r#"SELECT {USER_COLUMNS} FROM "users" WHERE "id" = $1"#
    ))
    .bind(id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_user).transpose()?)
}

pub async fn find_user_for_login(
    db: &Database,
    email: &str,
) -> Result<Option<UserWithPassword>, DbError> {
    let row = sqlx::query(&format!(
        r#"SELECT {USER_COLUMNS}, "passwordHash" FROM "users" WHERE "email" = $1 LIMIT 1"#
    ))
    .bind(email)
    .fetch_optional(db.pool())
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(UserWithPassword {
        profile: map_user(&row)?,
        password_hash: row.try_get("passwordHash")?,
    }))
}

pub async fn update_display_name(
    db: &Database,
    id: &str,
    display_name: &str,
) -> Result<UserProfile, DbError> {
    sqlx::query(r#"UPDATE "users" SET "displayName" = $1, "updatedAt" = $2 WHERE "id" = $3"#)
        .bind(display_name)
        .bind(now_iso())
        .bind(id)
        .execute(db.pool())
        .await?;

    get_user(db, id).await?.ok_or(DbError::NotFound("User"))
}

pub async fn update_password(db: &Database, id: &str, password_hash: &str) -> Result<(), DbError> {
    let result =
        sqlx::query(r#"UPDATE "users" SET "passwordHash" = $1, "updatedAt" = $2 WHERE "id" = $3"#)
            .bind(password_hash)
            .bind(now_iso())
            .bind(id)
            .execute(db.pool())
            .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound("User"));
    }
    Ok(())
}

/// Stamps `lastActivity` and advances the daily streak.
pub async fn record_activity(
    db: &Database,
    id: &str,
    now: DateTime<Utc>,
) -> Result<UserProfile, DbError> {
    let mut tx = db.pool().begin().await?;

    let row = sqlx::query(r#"SELECT "streak", "lastActivity" FROM "users" WHERE "id" = $1"#)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound("User"))?;

    let streak: i64 = row.try_get("streak")?;
    let last_activity: Option<String> = row.try_get("lastActivity")?;
    let last = last_activity
        .as_deref()
        .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|value| value.with_timezone(&Utc));

    let streak = next_streak(last, streak, now);
    let stamp = now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

    sqlx::query(
        r#"UPDATE "users" SET "streak" = $1, "lastActivity" = $2, "updatedAt" = $2 WHERE "id" = $3"#,
    )
    .bind(streak)
    .bind(&stamp)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get_user(db, id).await?.ok_or(DbError::NotFound("User"))
}

/// Recomputes the aggregate word counters from the user's lists and words.
pub async fn sync_progress_counters(db: &Database, id: &str) -> Result<UserProfile, DbError> {
    sqlx::query(
        r#"
        UPDATE "users" SET
            "totalWords" = (SELECT COALESCE(SUM("wordCount"), 0) FROM "lists" WHERE "userId" = $1),
            "learnedWords" = (SELECT COUNT(*) FROM "words" WHERE "userId" = $1 AND "learned" = 1),
            "updatedAt" = $2
        WHERE "id" = $1
        "#,
    )
    .bind(id)
    .bind(now_iso())
    .execute(db.pool())
    .await?;

    get_user(db, id).await?.ok_or(DbError::NotFound("User"))
}
