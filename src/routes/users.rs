use axum::extract::State;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Router};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::db::operations::users;
use crate::response::{ok, AppError, JsonBody};
use crate::state::AppState;

const MAX_DISPLAY_NAME_LEN: usize = 50;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/me", get(me).put(update_profile))
        .route("/api/users/me/progress/sync", post(sync_progress))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest {
    display_name: String,
}

async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    let profile = users::get_user(state.db(), &user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(ok(profile))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<UpdateProfileRequest>,
) -> Result<Response, AppError> {
    let display_name = payload.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::validation("Display name is required"));
    }
    if display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(AppError::validation(format!(
            "Display name must be at most {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }

    let profile = users::update_display_name(state.db(), &user.id, display_name).await?;
    Ok(ok(profile))
}

/// Recomputes the aggregate counters and counts as activity for the streak.
async fn sync_progress(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    users::sync_progress_counters(state.db(), &user.id).await?;
    let profile = users::record_activity(state.db(), &user.id, Utc::now()).await?;
    Ok(ok(profile))
}
