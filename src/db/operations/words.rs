use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::db::{now_iso, Database, DbError};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WordProgress {
    pub learned: bool,
    pub last_reviewed: Option<String>,
    pub review_count: i64,
    pub correct_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub list_id: String,
    pub user_id: String,
    pub word: String,
    pub meaning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub progress: WordProgress,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewWord {
    pub word: String,
    pub meaning: String,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WordChanges {
    pub word: Option<String>,
    pub meaning: Option<String>,
    /// `Some(None)` clears the context.
    pub context: Option<Option<String>>,
}

/// How a single practice step touches a word's progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub correct: bool,
    pub mark_learned: bool,
}

const WORD_COLUMNS: &str = r#""id", "listId", "userId", "word", "meaning", "context", "learned", "lastReviewed", "reviewCount", "correctCount", "createdAt""#;

fn map_word(row: &SqliteRow) -> Result<Word, sqlx::Error> {
    Ok(Word {
        id: row.try_get("id")?,
        list_id: row.try_get("listId")?,
        user_id: row.try_get("userId")?,
        word: row.try_get("word")?,
        meaning: row.try_get("meaning")?,
        context: row.try_get("context")?,
        progress: WordProgress {
            learned: row.try_get("learned")?,
            last_reviewed: row.try_get("lastReviewed")?,
            review_count: row.try_get("reviewCount")?,
            correct_count: row.try_get("correctCount")?,
        },
        created_at: row.try_get("createdAt")?,
    })
}

pub async fn words_in_list(
    db: &Database,
    user_id: &str,
    list_id: &str,
) -> Result<Vec<Word>, DbError> {
    let rows = sqlx::query(&format!(
        r#"SELECT {WORD_COLUMNS} FROM "words" WHERE "listId" = $1 AND "userId" = $2 ORDER BY "createdAt" ASC, "rowid" ASC"#
    ))
    .bind(list_id)
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_word).collect::<Result<Vec<_>, _>>()?)
}

pub async fn words_for_user(db: &Database, user_id: &str) -> Result<Vec<Word>, DbError> {
    let rows = sqlx::query(&format!(
        r#"SELECT {WORD_COLUMNS} FROM "words" WHERE "userId" = $1 ORDER BY "createdAt" ASC, "rowid" ASC"#
    ))
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_word).collect::<Result<Vec<_>, _>>()?)
}

pub async fn get_word(
    db: &Database,
    user_id: &str,
    word_id: &str,
) -> Result<Option<Word>, DbError> {
    let row = sqlx::query(&format!(
        r#"SELECT {WORD_COLUMNS} FROM "words" WHERE "id" = $1 AND "userId" = $2"#
    ))
    .bind(word_id)
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_word).transpose()?)
}

/// Inserts the word and bumps the parent list's `wordCount` in one transaction.
pub async fn insert_word(
    db: &Database,
    user_id: &str,
    list_id: &str,
    word: NewWord,
) -> Result<Word, DbError> {
    let id = Uuid::new_v4().to_string();
    let now = now_iso();
    let mut tx = db.pool().begin().await?;

    let bumped = sqlx::query(
        r#"UPDATE "lists" SET "wordCount" = "wordCount" + 1, "updatedAt" = $1 WHERE "id" = $2 AND "userId" = $3"#,
    )
    .bind(&now)
    .bind(list_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;
    if bumped.rows_affected() == 0 {
        return Err(DbError::NotFound("List"));
    }

    sqlx::query(
        r#"
        INSERT INTO "words" ("id", "listId", "userId", "word", "meaning", "context", "learned", "reviewCount", "correctCount", "createdAt")
        VALUES ($1, $2, $3, $4, $5, $6, 0, 0, 0, $7)
        "#,
    )
    .bind(&id)
    .bind(list_id)
    .bind(user_id)
    .bind(&word.word)
    .bind(&word.meaning)
    .bind(&word.context)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Word {
        id,
        list_id: list_id.to_string(),
        user_id: user_id.to_string(),
        word: word.word,
        meaning: word.meaning,
        context: word.context,
        progress: WordProgress::default(),
        created_at: now,
    })
}

pub async fn update_word(
    db: &Database,
    user_id: &str,
    word_id: &str,
    changes: WordChanges,
) -> Result<Word, DbError> {
    let mut word = get_word(db, user_id, word_id)
        .await?
        .ok_or(DbError::NotFound("Word"))?;

    if let Some(text) = changes.word {
        word.word = text;
    }
    if let Some(meaning) = changes.meaning {
        word.meaning = meaning;
    }
    if let Some(context) = changes.context {
        word.context = context;
    }

    sqlx::query(
        r#"UPDATE "words" SET "word" = $1, "meaning" = $2, "context" = $3 WHERE "id" = $4 AND "userId" = $5"#,
    )
    .bind(&word.word)
    .bind(&word.meaning)
    .bind(&word.context)
    .bind(word_id)
    .bind(user_id)
    .execute(db.pool())
    .await?;

    Ok(word)
}

/// Replaces the whole progress record, the way a client-side progress sync
/// does, and recounts the parent list's `learnedWords` in the same transaction.
pub async fn set_progress(
    db: &Database,
    user_id: &str,
    word_id: &str,
    progress: &WordProgress,
) -> Result<Word, DbError> {
    let mut tx = db.pool().begin().await?;

    let list_id: Option<String> = sqlx::query_scalar(
        r#"
        UPDATE "words"
        SET "learned" = $1, "lastReviewed" = $2, "reviewCount" = $3, "correctCount" = $4
        WHERE "id" = $5 AND "userId" = $6
        RETURNING "listId"
        "#,
    )
    .bind(progress.learned)
    .bind(&progress.last_reviewed)
    .bind(progress.review_count)
    .bind(progress.correct_count)
    .bind(word_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(list_id) = list_id else {
        return Err(DbError::NotFound("Word"));
    };

    sqlx::query(
        r#"
        UPDATE "lists" SET
            "learnedWords" = (SELECT COUNT(*) FROM "words" WHERE "listId" = $1 AND "learned" = 1),
            "updatedAt" = $2
        WHERE "id" = $1
        "#,
    )
    .bind(&list_id)
    .bind(now_iso())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get_word(db, user_id, word_id)
        .await?
        .ok_or(DbError::NotFound("Word"))
}

/// Applies one practice step atomically: counters are incremented in SQL so
/// concurrent sessions on the same word do not lose updates.
pub async fn record_review(
    db: &Database,
    word_id: &str,
    outcome: ReviewOutcome,
) -> Result<(), DbError> {
    let result = sqlx::query(
        r#"
        UPDATE "words" SET
            "learned" = CASE WHEN $1 THEN 1 ELSE "learned" END,
            "lastReviewed" = $2,
            "reviewCount" = "reviewCount" + 1,
            "correctCount" = "correctCount" + CASE WHEN $3 THEN 1 ELSE 0 END
        WHERE "id" = $4
        "#,
    )
    .bind(outcome.mark_learned)
    .bind(now_iso())
    .bind(outcome.correct)
    .bind(word_id)
    .execute(db.pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound("Word"));
    }
    Ok(())
}

/// Deletes the word and decrements the parent list's `wordCount` in one transaction.
pub async fn delete_word(db: &Database, user_id: &str, word_id: &str) -> Result<(), DbError> {
    let mut tx = db.pool().begin().await?;

    let list_id: Option<String> =
        sqlx::query_scalar(r#"SELECT "listId" FROM "words" WHERE "id" = $1 AND "userId" = $2"#)
            .bind(word_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(list_id) = list_id else {
        return Err(DbError::NotFound("Word"));
    };

    sqlx::query(r#"DELETE FROM "words" WHERE "id" = $1"#)
        .bind(word_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        UPDATE "lists" SET
            "wordCount" = MAX("wordCount" - 1, 0),
            "learnedWords" = (SELECT COUNT(*) FROM "words" WHERE "listId" = $1 AND "learned" = 1),
            "updatedAt" = $2
        WHERE "id" = $1
        "#,
    )
    .bind(&list_id)
    .bind(now_iso())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
