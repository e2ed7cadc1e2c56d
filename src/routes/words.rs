use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, put};
use axum::{Extension, Router};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::db::operations::lists;
use crate::db::operations::words::{self, NewWord, WordChanges, WordProgress};
use crate::response::{created, ok, AppError, JsonBody};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/lists/:id/words", get(list_words).post(create_word))
        .route("/api/words", get(all_words))
        .route("/api/words/:id", put(update_word).delete(delete_word))
        .route("/api/words/:id/progress", put(set_progress))
}

#[derive(Debug, Deserialize)]
struct CreateWordRequest {
    word: String,
    meaning: String,
    #[serde(default)]
    context: Option<String>,
}

/// An empty `context` clears it; an absent one leaves it alone.
#[derive(Debug, Deserialize)]
struct UpdateWordRequest {
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    meaning: Option<String>,
    #[serde(default)]
    context: Option<String>,
}

#[derive(Serialize)]
struct DeletedWord {
    id: String,
}

async fn list_words(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(list_id): Path<String>,
) -> Result<Response, AppError> {
    if lists::get_list(state.db(), &user.id, &list_id).await?.is_none() {
        return Err(AppError::not_found("List not found"));
    }
    let words = words::words_in_list(state.db(), &user.id, &list_id).await?;
    Ok(ok(words))
}

async fn all_words(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    let words = words::words_for_user(state.db(), &user.id).await?;
    Ok(ok(words))
}

async fn create_word(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(list_id): Path<String>,
    JsonBody(payload): JsonBody<CreateWordRequest>,
) -> Result<Response, AppError> {
    let new_word = NewWord {
        word: required(&payload.word, "Word")?,
        meaning: required(&payload.meaning, "Meaning")?,
        context: optional_context(payload.context.as_deref()),
    };

    let word = words::insert_word(state.db(), &user.id, &list_id, new_word).await?;
    Ok(created(word))
}

async fn update_word(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateWordRequest>,
) -> Result<Response, AppError> {
    let changes = WordChanges {
        word: payload.word.as_deref().map(|w| required(w, "Word")).transpose()?,
        meaning: payload.meaning.as_deref().map(|m| required(m, "Meaning")).transpose()?,
        context: payload.context.as_deref().map(|c| optional_context(Some(c))),
    };

    let word = words::update_word(state.db(), &user.id, &id, changes).await?;
    Ok(ok(word))
}

async fn set_progress(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(progress): JsonBody<WordProgress>,
) -> Result<Response, AppError> {
    validate_progress(&progress)?;
    let word = words::set_progress(state.db(), &user.id, &id, &progress).await?;
    Ok(ok(word))
}

async fn delete_word(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    words::delete_word(state.db(), &user.id, &id).await?;
    Ok(ok(DeletedWord { id }))
}

fn required(raw: &str, field: &str) -> Result<String, AppError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn optional_context(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|context| !context.is_empty())
        .map(str::to_string)
}

fn validate_progress(progress: &WordProgress) -> Result<(), AppError> {
    if progress.review_count < 0 || progress.correct_count < 0 {
        return Err(AppError::validation("Counts must not be negative"));
    }
    if progress.correct_count > progress.review_count {
        return Err(AppError::validation("correctCount cannot exceed reviewCount"));
    }
    Ok(())
}
