use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::db::operations::lists::{self, ListChanges, NewList};
use crate::response::{created, ok, AppError, JsonBody};
use crate::state::AppState;

pub const MAX_LIST_NAME_LEN: usize = 100;
pub const MAX_LIST_DESCRIPTION_LEN: usize = 500;
const DEFAULT_LANGUAGE: &str = "English";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/lists", get(list_lists).post(create_list))
        .route(
            "/api/lists/:id",
            get(get_list).put(update_list).delete(delete_list),
        )
}

#[derive(Debug, Deserialize)]
struct CreateListRequest {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateListRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteListResponse {
    id: String,
    deleted_words: u64,
}

async fn list_lists(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    let lists = lists::lists_for_user(state.db(), &user.id).await?;
    Ok(ok(lists))
}

async fn create_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<CreateListRequest>,
) -> Result<Response, AppError> {
    let new_list = NewList {
        name: validate_name(&payload.name)?,
        description: validate_description(payload.description.as_deref().unwrap_or_default())?,
        language: payload
            .language
            .map(|language| language.trim().to_string())
            .filter(|language| !language.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        source: payload.source.map(|source| source.trim().to_string()).unwrap_or_default(),
    };

    let list = lists::insert_list(state.db(), &user.id, new_list).await?;
    tracing::debug!(list_id = %list.id, "list created");
    Ok(created(list))
}

async fn get_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let list = lists::get_list(state.db(), &user.id, &id)
        .await?
        .ok_or_else(|| AppError::not_found("List not found"))?;
    Ok(ok(list))
}

async fn update_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateListRequest>,
) -> Result<Response, AppError> {
    let changes = ListChanges {
        name: payload.name.as_deref().map(validate_name).transpose()?,
        description: payload.description.as_deref().map(validate_description).transpose()?,
        language: payload
            .language
            .map(|language| language.trim().to_string())
            .filter(|language| !language.is_empty()),
        source: payload.source.map(|source| source.trim().to_string()),
    };

    let list = lists::update_list(state.db(), &user.id, &id, changes).await?;
    Ok(ok(list))
}

async fn delete_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let deleted_words = lists::delete_list(state.db(), &user.id, &id).await?;
    Ok(ok(DeleteListResponse { id, deleted_words }))
}

fn validate_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("List name is required"));
    }
    if name.chars().count() > MAX_LIST_NAME_LEN {
        return Err(AppError::validation(format!(
            "List name must be at most {MAX_LIST_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_description(raw: &str) -> Result<String, AppError> {
    let description = raw.trim();
    if description.chars().count() > MAX_LIST_DESCRIPTION_LEN {
        return Err(AppError::validation(format!(
            "Description must be at most {MAX_LIST_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(description.to_string())
}
