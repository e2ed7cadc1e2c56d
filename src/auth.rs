use axum::http::{header, HeaderMap, HeaderValue};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::Config;
use crate::db::operations::{auth_sessions, users};
use crate::db::{Database, DbError};
use crate::response::AppError;

pub const AUTH_COOKIE_NAME: &str = "auth_token";
const BCRYPT_COST: u32 = 10;

type HmacSha256 = Hmac<Sha256>;

/// The caller behind a verified token, inserted into request extensions by
/// the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub token_hash: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("missing JWT_SECRET")]
    MissingSecret,
    #[error("invalid JWT_EXPIRES_IN")]
    InvalidExpiresIn,
    #[error("database error: {0}")]
    Database(#[from] DbError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => AppError::unauthorized("Authentication required"),
            AuthError::InvalidToken => AppError::unauthorized("Invalid or expired session"),
            AuthError::MissingSecret | AuthError::InvalidExpiresIn => {
                tracing::warn!(error = %err, "token issuance misconfigured");
                AppError::internal(err.to_string())
            }
            AuthError::Database(err) => err.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtClaims {
    pub user_id: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    pub fn max_age_secs(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}

/// Bearer header first, then the auth cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    get_cookie(headers, AUTH_COOKIE_NAME)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|err| AppError::internal(err.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn sign_jwt(user_id: &str, secret: &str, expires_in: &str) -> Result<IssuedToken, AuthError> {
    let expires_in_ms = parse_expires_in_ms(expires_in)?;

    let issued_at = Utc::now();
    let exp = issued_at
        .checked_add_signed(chrono::Duration::milliseconds(expires_in_ms))
        .ok_or(AuthError::InvalidExpiresIn)?;

    let header_json = serde_json::json!({ "alg": "HS256", "typ": "JWT" });
    let payload_json = serde_json::json!({
        "userId": user_id,
        "iat": issued_at.timestamp(),
        "exp": exp.timestamp(),
    });

    let header_b64 = URL_SAFE_NO_PAD.encode(header_json.to_string());
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json.to_string());
    let signing_input = format!("{header_b64}.{payload_b64}");

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| AuthError::MissingSecret)?;
    mac.update(signing_input.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(IssuedToken {
        token: format!("{signing_input}.{sig_b64}"),
        expires_at: exp,
    })
}

pub fn verify_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(sig_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::InvalidToken);
    };

    let decode = |part: &str| URL_SAFE_NO_PAD.decode(part.as_bytes()).map_err(|_| AuthError::InvalidToken);
    let header_bytes = decode(header_b64)?;
    let payload_bytes = decode(payload_b64)?;
    let sig_bytes = decode(sig_b64)?;

    let header_json: serde_json::Value =
        serde_json::from_slice(&header_bytes).map_err(|_| AuthError::InvalidToken)?;
    if header_json.get("alg").and_then(|value| value.as_str()) != Some("HS256") {
        return Err(AuthError::InvalidToken);
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| AuthError::MissingSecret)?;
    mac.update(format!("{header_b64}.{payload_b64}").as_bytes());
    mac.verify_slice(&sig_bytes).map_err(|_| AuthError::InvalidToken)?;

    let payload: serde_json::Value =
        serde_json::from_slice(&payload_bytes).map_err(|_| AuthError::InvalidToken)?;

    let user_id = payload
        .get("userId")
        .and_then(|value| value.as_str())
        .ok_or(AuthError::InvalidToken)?
        .to_string();
    let issued_at = payload.get("iat").and_then(|value| value.as_i64()).unwrap_or(0);
    let expires_at = payload
        .get("exp")
        .and_then(|value| value.as_i64())
        .ok_or(AuthError::InvalidToken)?;

    if Utc::now().timestamp() >= expires_at {
        return Err(AuthError::InvalidToken);
    }

    Ok(JwtClaims {
        user_id,
        issued_at,
        expires_at,
    })
}

/// `<n>{s|m|h|d}` to milliseconds.
pub fn parse_expires_in_ms(value: &str) -> Result<i64, AuthError> {
    let trimmed = value.trim();
    if trimmed.len() < 2 {
        return Err(AuthError::InvalidExpiresIn);
    }

    let (digits, unit) = trimmed.split_at(trimmed.len() - 1);
    let amount: i64 = digits.parse().map_err(|_| AuthError::InvalidExpiresIn)?;
    if amount <= 0 {
        return Err(AuthError::InvalidExpiresIn);
    }

    let unit_ms = match unit {
        "s" => 1000,
        "m" => 60 * 1000,
        "h" => 60 * 60 * 1000,
        "d" => 24 * 60 * 60 * 1000,
        _ => return Err(AuthError::InvalidExpiresIn),
    };
    amount.checked_mul(unit_ms).ok_or(AuthError::InvalidExpiresIn)
}

/// Signs a token for `user_id` and stores its hash as a session row.
pub async fn issue_session(db: &Database, config: &Config, user_id: &str) -> Result<IssuedToken, AuthError> {
    let secret = config.jwt_secret.as_deref().ok_or(AuthError::MissingSecret)?;
    let issued = sign_jwt(user_id, secret, &config.jwt_expires_in)?;

    let expires_at = issued.expires_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    auth_sessions::insert_session(db, user_id, &hash_token(&issued.token), &expires_at).await?;

    Ok(issued)
}

/// A token is only good while its session row exists and has not expired.
pub async fn verify_request_token(db: &Database, config: &Config, token: &str) -> Result<AuthUser, AuthError> {
    let secret = config.jwt_secret.as_deref().ok_or(AuthError::MissingSecret)?;
    let claims = verify_jwt(token, secret)?;

    let token_hash = hash_token(token);
    let session = auth_sessions::find_session(db, &token_hash)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    if session.user_id != claims.user_id {
        return Err(AuthError::InvalidToken);
    }

    let expired = DateTime::parse_from_rfc3339(&session.expires_at)
        .map(|at| at.with_timezone(&Utc) <= Utc::now())
        .unwrap_or(true);
    if expired {
        return Err(AuthError::InvalidToken);
    }

    let user = users::get_user(db, &claims.user_id)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    Ok(AuthUser {
        id: user.id,
        email: user.email,
        token_hash,
    })
}

pub fn auth_cookie_header(token: &str, max_age_secs: i64, secure: bool) -> Option<HeaderValue> {
    let mut cookie =
        format!("{AUTH_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

pub fn clear_auth_cookie_header(secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{AUTH_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
