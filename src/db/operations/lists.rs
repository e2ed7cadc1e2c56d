use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::db::{now_iso, Database, DbError};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListProgress {
    pub learned_words: i64,
    pub last_studied: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordList {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub language: String,
    pub source: String,
    pub word_count: i64,
    pub progress: ListProgress,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewList {
    pub name: String,
    pub description: String,
    pub language: String,
    pub source: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub source: Option<String>,
}

const LIST_COLUMNS: &str = r#""id", "userId", "name", "description", "language", "source", "wordCount", "learnedWords", "lastStudied", "createdAt", "updatedAt""#;

fn map_list(row: &SqliteRow) -> Result<WordList, sqlx::Error> {
    Ok(WordList {
        id: row.try_get("id")?,
        user_id: row.try_get("userId")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        language: row.try_get("language")?,
        source: row.try_get("source")?,
        word_count: row.try_get("wordCount")?,
        progress: ListProgress {
            learned_words: row.try_get("learnedWords")?,
            last_studied: row.try_get("lastStudied")?,
        },
        created_at: row.try_get("createdAt")?,
        updated_at: row.try_get("updatedAt")?,
    })
}

pub async fn lists_for_user(db: &Database, user_id: &str) -> Result<Vec<WordList>, DbError> {
    let rows = sqlx::query(&format!(
        r#"SELECT {LIST_COLUMNS} FROM "lists" WHERE "userId" = $1 ORDER BY "createdAt" ASC, "rowid" ASC"#
    ))
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_list).collect::<Result<Vec<_>, _>>()?)
}

/// Fetches a list only when `user_id` owns it.
pub async fn get_list(
    db: &Database,
    user_id: &str,
    list_id: &str,
) -> Result<Option<WordList>, DbError> {
    let row = sqlx::query(&format!(
        r#"SELECT {LIST_COLUMNS} FROM "lists" WHERE "id" = $1 AND "userId" = $2"#
    ))
    .bind(list_id)
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_list).transpose()?)
}

pub async fn insert_list(db: &Database, user_id: &str, list: NewList) -> Result<WordList, DbError> {
    let id = Uuid::new_v4().to_string();
    let now = now_iso();

    sqlx::query(
        r#"
        INSERT INTO "lists" ("id", "userId", "name", "description", "language", "source", "wordCount", "learnedWords", "createdAt", "updatedAt")
        VALUES ($1, $2, $3, $4, $5, $6, 0, 0, $7, $7)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(&list.name)
    .bind(&list.description)
    .bind(&list.language)
    .bind(&list.source)
    .bind(&now)
    .execute(db.pool())
    .await?;

    Ok(WordList {
        id,
        user_id: user_id.to_string(),
        name: list.name,
        description: list.description,
        language: list.language,
        source: list.source,
        word_count: 0,
        progress: ListProgress {
            learned_words: 0,
            last_studied: None,
        },
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_list(
    db: &Database,
    user_id: &str,
    list_id: &str,
    changes: ListChanges,
) -> Result<WordList, DbError> {
    let mut list = get_list(db, user_id, list_id)
        .await?
        .ok_or(DbError::NotFound("List"))?;

    if let Some(name) = changes.name {
        list.name = name;
    }
    if let Some(description) = changes.description {
        list.description = description;
    }
    if let Some(language) = changes.language {
        list.language = language;
    }
    if let Some(source) = changes.source {
        list.source = source;
    }
    list.updated_at = now_iso();

    sqlx::query(
        r#"
        UPDATE "lists"
        SET "name" = $1, "description" = $2, "language" = $3, "source" = $4, "updatedAt" = $5
        WHERE "id" = $6 AND "userId" = $7
        "#,
    )
    .bind(&list.name)
    .bind(&list.description)
    .bind(&list.language)
    .bind(&list.source)
    .bind(&list.updated_at)
    .bind(list_id)
    .bind(user_id)
    .execute(db.pool())
    .await?;

    Ok(list)
}

/// Deletes the list together with every word that references it.
pub async fn delete_list(db: &Database, user_id: &str, list_id: &str) -> Result<u64, DbError> {
    let mut tx = db.pool().begin().await?;

    let owned: Option<String> =
        sqlx::query_scalar(r#"SELECT "id" FROM "lists" WHERE "id" = $1 AND "userId" = $2"#)
            .bind(list_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    if owned.is_none() {
        return Err(DbError::NotFound("List"));
    }

    let words = sqlx::query(r#"DELETE FROM "words" WHERE "listId" = $1"#)
        .bind(list_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(r#"DELETE FROM "lists" WHERE "id" = $1"#)
        .bind(list_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(words.rows_affected())
}

/// Stamps `lastStudied`; when `refresh_learned` is set the learned counter is
/// recomputed from the list's words.
pub async fn mark_studied(
    db: &Database,
    list_id: &str,
    refresh_learned: bool,
) -> Result<(), DbError> {
    let now = now_iso();
    let sql = if refresh_learned {
        r#"
        UPDATE "lists" SET
            "learnedWords" = (SELECT COUNT(*) FROM "words" WHERE "listId" = $1 AND "learned" = 1),
            "lastStudied" = $2,
            "updatedAt" = $2
        WHERE "id" = $1
        "#
    } else {
        r#"UPDATE "lists" SET "lastStudied" = $2, "updatedAt" = $2 WHERE "id" = $1"#
    };

    sqlx::query(sql)
        .bind(list_id)
        .bind(&now)
        .execute(db.pool())
        .await?;
    Ok(())
}
