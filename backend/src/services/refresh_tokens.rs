use chrono::{DateTime, Duration, Utc};
use rand::{CryptoRng, RngCore};
use rand_core::OsRng;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::RefreshTokenRow;

pub const REFRESH_TOKEN_BYTES: usize = 32;
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 60;

#[derive(Debug, Error)]
pub enum RefreshTokenError {
    #[error("Refresh token not found")]
    NotFound,
    #[error("Refresh token already exists")]
    DuplicateToken,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// 32 random bytes as 64 lowercase hex characters
pub fn generate_token<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a fresh token for `user_id` and persist it
pub async fn issue(pool: &SqlitePool, user_id: &Uuid) -> Result<String, RefreshTokenError> {
    let token = generate_token(&mut OsRng);
    create(pool, user_id, &token, Utc::now()).await?;
    Ok(token)
}

pub async fn create(
    pool: &SqlitePool,
    user_id: &Uuid,
    token: &str,
    now: DateTime<Utc>,
) -> Result<RefreshTokenRow, RefreshTokenError> {
    let expires_at = now + Duration::days(REFRESH_TOKEN_LIFETIME_DAYS);

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (token, created_at, updated_at, user_id, expires_at, revoked_at)
        VALUES (?, ?, ?, ?, ?, NULL)
        "#,
    )
    .bind(token)
    .bind(now)
    .bind(now)
    .bind(user_id)
    .bind(expires_at)
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            RefreshTokenError::DuplicateToken
        }
        other => RefreshTokenError::DatabaseError(other),
    })?;

    Ok(RefreshTokenRow {
        token: token.to_string(),
        created_at: now,
        updated_at: now,
        user_id: *user_id,
        expires_at,
        revoked_at: None,
    })
}

pub async fn lookup(pool: &SqlitePool, token: &str) -> Result<RefreshTokenRow, RefreshTokenError> {
    let row: Option<RefreshTokenRow> = sqlx::query_as("SELECT * FROM refresh_tokens WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;

    row.ok_or(RefreshTokenError::NotFound)
}

/// Mark a token revoked. Revoking twice succeeds and keeps the first timestamp.
pub async fn revoke(
    pool: &SqlitePool,
    token: &str,
    now: DateTime<Utc>,
) -> Result<(), RefreshTokenError> {
    let result = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked_at = COALESCE(revoked_at, ?),
            updated_at = CASE WHEN revoked_at IS NULL THEN ? ELSE updated_at END
        WHERE token = ?
        "#,
    )
    .bind(now)
    .bind(now)
    .bind(token)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RefreshTokenError::NotFound);
    }

    Ok(())
}
