//! Login, refresh and revoke built on the password hasher, the access token
//! codec and the refresh token store.
//!
//! Lifecycle of one login, as the client sees it:
//!
//! ```text
//! unauthenticated --login--> active --access expiry--> stale --refresh--> active
//!                                                        |
//!                                  refresh expiry/revoke v
//!                                                    terminated
//! ```
//!
//! `terminated` is only left through a new login. Refresh tokens are reused
//! as-is on every refresh; only the access token is reissued.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::services::password;
use crate::services::refresh_tokens::{self, RefreshTokenError};
use crate::services::tokens::{self, TokenError};
use crate::services::users::{self, UserError};
use shared::User;

/// Upper bound for a client-requested access token lifetime
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
    #[error("Refresh token store error: {0}")]
    RefreshTokenError(RefreshTokenError),
    #[error("User store error: {0}")]
    UserError(#[from] UserError),
}

impl From<RefreshTokenError> for SessionError {
    fn from(e: RefreshTokenError) -> Self {
        match e {
            // Unknown tokens are never distinguished from expired or revoked ones
            RefreshTokenError::NotFound => SessionError::InvalidRefreshToken,
            other => SessionError::RefreshTokenError(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Pick the access token lifetime for a login: the requested value when it lies
/// within `1..=MAX_ACCESS_TOKEN_TTL_SECONDS`, the configured default otherwise.
pub fn access_token_ttl(requested_seconds: Option<i64>, default_seconds: i64) -> Duration {
    match requested_seconds {
        Some(secs) if (1..=MAX_ACCESS_TOKEN_TTL_SECONDS).contains(&secs) => Duration::seconds(secs),
        _ => Duration::seconds(default_seconds),
    }
}

pub async fn login(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    secret: &str,
    ttl: Duration,
) -> Result<LoginSession, SessionError> {
    let user = users::get_user_by_email(pool, email)
        .await?
        .ok_or(SessionError::UserNotFound)?;

    password::verify_password(password, &user.password_hash)
        .map_err(|_| SessionError::InvalidCredentials)?;

    let access_token = tokens::issue(&user.id, secret, ttl)?;
    let refresh_token = refresh_tokens::issue(pool, &user.id).await?;

    log::info!("User {} logged in", user.id);

    Ok(LoginSession {
        user: user.to_shared(),
        access_token,
        refresh_token,
    })
}

/// Exchange a usable refresh token for a new access token
pub async fn refresh(
    pool: &SqlitePool,
    refresh_token: &str,
    secret: &str,
    ttl: Duration,
) -> Result<String, SessionError> {
    let record = refresh_tokens::lookup(pool, refresh_token).await?;

    if !record.is_usable(Utc::now()) {
        log::debug!(
            "Refresh token for user {} rejected (revoked: {})",
            record.user_id,
            record.revoked_at.is_some()
        );
        return Err(SessionError::InvalidRefreshToken);
    }

    // The token row alone is not enough, the account must still exist
    let user = users::get_user_by_id(pool, &record.user_id)
        .await?
        .ok_or(SessionError::InvalidRefreshToken)?;

    Ok(tokens::issue(&user.id, secret, ttl)?)
}

pub async fn revoke(pool: &SqlitePool, refresh_token: &str) -> Result<(), SessionError> {
    refresh_tokens::revoke(pool, refresh_token, Utc::now()).await?;
    Ok(())
}

/// Resolve an access token to the account it was issued for
pub fn authenticate(access_token: &str, secret: &str) -> Result<Uuid, TokenError> {
    tokens::verify(access_token, secret)
}
