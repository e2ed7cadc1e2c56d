use crate::db::{Database, DbError};
use crate::services::search::push_recent;

pub async fn recent_searches(db: &Database, user_id: &str) -> Result<Vec<String>, DbError> {
    let rows: Vec<String> = sqlx::query_scalar(
        r#"SELECT "query" FROM "recent_searches" WHERE "userId" = $1 ORDER BY "position" ASC"#,
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;
    Ok(rows)
}

/// Pushes `query` onto the user's recent searches and returns the new list.
pub async fn record_search(
    db: &Database,
    user_id: &str,
    query: &str,
) -> Result<Vec<String>, DbError> {
    let mut tx = db.pool().begin().await?;

    let existing: Vec<String> = sqlx::query_scalar(
        r#"SELECT "query" FROM "recent_searches" WHERE "userId" = $1 ORDER BY "position" ASC"#,
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    let updated = push_recent(existing.clone(), query);
    if updated == existing {
        tx.commit().await?;
        return Ok(updated);
    }

    sqlx::query(r#"DELETE FROM "recent_searches" WHERE "userId" = $1"#)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for (position, entry) in updated.iter().enumerate() {
        sqlx::query(
            r#"INSERT INTO "recent_searches" ("userId", "query", "position") VALUES ($1, $2, $3)"#,
        )
        .bind(user_id)
        .bind(entry)
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(updated)
}

pub async fn clear_searches(db: &Database, user_id: &str) -> Result<(), DbError> {
    sqlx::query(r#"DELETE FROM "recent_searches" WHERE "userId" = $1"#)
        .bind(user_id)
        .execute(db.pool())
        .await?;
    Ok(())
}
