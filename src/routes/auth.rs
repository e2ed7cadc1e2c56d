use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Router};
use chrono::{Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{self, AuthUser};
use crate::db::now_iso;
use crate::db::operations::users::UserProfile;
use crate::db::operations::{auth_sessions, password_reset, users};
use crate::response::{created, message, ok, AppError, JsonBody};
use crate::state::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;
const RESET_TOKEN_TTL_MINUTES: i64 = 15;
const RESET_REQUEST_COOLDOWN_SECS: i64 = 60;
const RESET_REQUESTED_MESSAGE: &str = "If that email is registered, a reset link is on its way";

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/password/request", post(request_password_reset))
        .route("/api/auth/password/reset", post(reset_password))
}

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/verify", get(verify))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    email: String,
    password: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct PasswordResetRequest {
    email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResetConfirmRequest {
    token: String,
    new_password: String,
}

#[derive(Serialize)]
struct AuthData {
    user: UserProfile,
    token: String,
}

#[derive(Serialize)]
struct VerifyData {
    user: UserProfile,
}

async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<Response, AppError> {
    let email = normalize_email(&payload.email);
    if !is_valid_email(&email) {
        return Err(AppError::validation("Email address is invalid"));
    }
    validate_password(&payload.password)?;

    let display_name = payload.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::validation("Display name is required"));
    }

    if users::email_exists(state.db(), &email).await? {
        return Err(AppError::conflict("Email is already registered"));
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let user_id = Uuid::new_v4().to_string();
    let user = users::insert_user(state.db(), &user_id, &email, &password_hash, display_name).await?;

    let issued = auth::issue_session(state.db(), state.config(), &user.id).await?;
    tracing::info!(user_id = %user.id, "user registered");

    let cookie = auth::auth_cookie_header(&issued.token, issued.max_age_secs(), state.config().production);
    Ok(with_cookie(
        created(AuthData {
            user,
            token: issued.token,
        }),
        cookie,
    ))
}

async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Response, AppError> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let invalid = || AppError::unauthorized("Invalid email or password");

    let found = users::find_user_for_login(state.db(), &email)
        .await?
        .ok_or_else(invalid)?;
    if !auth::verify_password(&payload.password, &found.password_hash) {
        return Err(invalid());
    }

    let issued = auth::issue_session(state.db(), state.config(), &found.profile.id).await?;

    let cookie = auth::auth_cookie_header(&issued.token, issued.max_age_secs(), state.config().production);
    Ok(with_cookie(
        ok(AuthData {
            user: found.profile,
            token: issued.token,
        }),
        cookie,
    ))
}

async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    auth_sessions::delete_session_by_token_hash(state.db(), &user.token_hash).await?;

    let cookie = auth::clear_auth_cookie_header(state.config().production);
    Ok(with_cookie(message("Logged out"), cookie))
}

async fn verify(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    let profile = users::get_user(state.db(), &user.id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid or expired session"))?;
    Ok(ok(VerifyData { user: profile }))
}

/// Always answers the same way so the response does not reveal whether the
/// account exists.
async fn request_password_reset(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PasswordResetRequest>,
) -> Response {
    let email = normalize_email(&payload.email);
    if is_valid_email(&email) {
        if let Err(err) = start_password_reset(&state, &email).await {
            tracing::warn!(error = %err, "password reset request failed");
        }
    }
    message(RESET_REQUESTED_MESSAGE)
}

async fn start_password_reset(state: &AppState, email: &str) -> Result<(), AppError> {
    let email_service = state.email_service();
    if !email_service.is_available() {
        tracing::warn!("password reset requested but email service not configured");
        return Ok(());
    }

    let Some(found) = users::find_user_for_login(state.db(), email).await? else {
        return Ok(());
    };
    let user_id = found.profile.id;

    let now = Utc::now();
    if let Some(last) = password_reset::last_request_time(state.db(), &user_id).await? {
        let elapsed = (now - last).num_seconds();
        if elapsed < RESET_REQUEST_COOLDOWN_SECS {
            tracing::debug!(user_id = %user_id, elapsed, "rate limited password reset request");
            return Ok(());
        }
    }

    password_reset::invalidate_user_tokens(state.db(), &user_id).await?;

    let raw_token = Uuid::new_v4().simple().to_string();
    let expires_at = (now + Duration::minutes(RESET_TOKEN_TTL_MINUTES))
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    password_reset::create_token(state.db(), &user_id, &auth::hash_token(&raw_token), &expires_at).await?;

    let reset_link = format!(
        "{}/reset-password?token={raw_token}",
        state.config().frontend_url.trim_end_matches('/')
    );
    if let Err(err) = email_service.send_password_reset(email, &reset_link).await {
        tracing::warn!(error = %err, "password reset email send failed");
    }
    Ok(())
}

async fn reset_password(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PasswordResetConfirmRequest>,
) -> Result<Response, AppError> {
    let token = payload.token.trim();
    if token.is_empty() {
        return Err(AppError::validation("Reset token is required"));
    }
    validate_password(&payload.new_password)?;

    let record = password_reset::find_valid_token(state.db(), &auth::hash_token(token), &now_iso())
        .await?
        .ok_or_else(|| AppError::bad_request("Reset token is invalid or expired"))?;

    let password_hash = auth::hash_password(&payload.new_password)?;
    users::update_password(state.db(), &record.user_id, &password_hash).await?;
    password_reset::mark_used(state.db(), &record.id).await?;
    let revoked = auth_sessions::delete_user_sessions(state.db(), &record.user_id).await?;

    tracing::info!(user_id = %record.user_id, revoked, "password reset");
    Ok(message("Password has been reset"))
}

fn with_cookie(mut response: Response, cookie: Option<HeaderValue>) -> Response {
    if let Some(cookie) = cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

fn is_valid_email(value: &str) -> bool {
    if value.is_empty() || value.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && !domain.contains('@') && domain.contains('.') && !domain.ends_with('.')
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
