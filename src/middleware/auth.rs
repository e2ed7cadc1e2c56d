use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::AuthError;
use crate::response::AppError;
use crate::state::AppState;

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = crate::auth::extract_token(req.headers()) else {
        return AppError::from(AuthError::MissingToken).into_response();
    };

    match crate::auth::verify_request_token(state.db(), state.config(), &token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(err) => {
            if !matches!(err, AuthError::InvalidToken) {
                tracing::warn!(error = %err, "token verification failed");
            }
            AppError::from(err).into_response()
        }
    }
}
