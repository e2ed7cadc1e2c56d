use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};

use crate::auth::AuthUser;
use crate::db::operations::searches;
use crate::db::operations::settings::{self, SettingsPatch, UserSettings};
use crate::response::{ok, AppError, JsonBody};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/settings",
        get(get_settings).put(update_settings).delete(reset_settings),
    )
}

async fn get_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    Ok(ok(settings::get_settings(state.db(), &user.id).await?))
}

async fn update_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(patch): JsonBody<SettingsPatch>,
) -> Result<Response, AppError> {
    let updated = settings::get_settings(state.db(), &user.id).await?.apply(patch);
    settings::save_settings(state.db(), &user.id, &updated).await?;
    Ok(ok(updated))
}

/// Back to defaults; the "clear app data" action also forgets recent searches.
async fn reset_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    settings::reset_settings(state.db(), &user.id).await?;
    searches::clear_searches(state.db(), &user.id).await?;
    Ok(ok(UserSettings::default()))
}
