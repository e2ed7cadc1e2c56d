use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};

use crate::auth::AuthUser;
use crate::db::operations::lists;
use crate::response::{ok, AppError};
use crate::services::progress::overview;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/progress", get(progress_overview))
}

async fn progress_overview(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    let lists = lists::lists_for_user(state.db(), &user.id).await?;
    Ok(ok(overview(&lists)))
}
