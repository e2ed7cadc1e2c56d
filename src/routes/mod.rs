mod auth;
mod health;
mod lists;
mod progress;
mod search;
mod sessions;
mod settings;
mod users;
mod words;

use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::middleware::auth::require_auth;
use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    // `route_layer` keeps unknown paths at 404 instead of 401.
    let protected = Router::new()
        .merge(auth::protected_router())
        .merge(users::router())
        .merge(lists::router())
        .merge(words::router())
        .merge(sessions::router())
        .merge(progress::router())
        .merge(search::router())
        .merge(settings::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(auth::public_router())
        .merge(protected)
        .nest("/health", health::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    AppError::not_found("Route not found").into_response()
}
