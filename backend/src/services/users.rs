use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::UserRow;
use shared::User;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

fn map_unique_violation(e: sqlx::Error) -> UserError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => UserError::UserAlreadyExists,
        other => UserError::DatabaseError(other),
    }
}

pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
) -> Result<User, UserError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (id, created_at, updated_at, email, password_hash, is_upgraded)
        VALUES (?, ?, ?, ?, ?, FALSE)
        "#,
    )
    .bind(id)
    .bind(now)
    .bind(now)
    .bind(email)
    .bind(password_hash)
    .execute(pool)
    .await
    .map_err(map_unique_violation)?;

    Ok(User {
        id,
        created_at: now,
        updated_at: now,
        email: email.to_string(),
        is_upgraded: false,
    })
}

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRow>, UserError> {
    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn get_user_by_id(pool: &SqlitePool, user_id: &Uuid) -> Result<Option<UserRow>, UserError> {
    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn update_user(
    pool: &SqlitePool,
    user_id: &Uuid,
    email: &str,
    password_hash: &str,
) -> Result<User, UserError> {
    let now = Utc::now();

    let user: UserRow = sqlx::query_as(
        r#"
        UPDATE users SET email = ?, password_hash = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(map_unique_violation)?
    .ok_or(UserError::UserNotFound)?;

    Ok(user.to_shared())
}

/// Grant the paid tier. Upgrading an already upgraded account is a no-op success.
pub async fn upgrade_user(pool: &SqlitePool, user_id: &Uuid) -> Result<(), UserError> {
    let result = sqlx::query("UPDATE users SET is_upgraded = TRUE, updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(UserError::UserNotFound);
    }

    Ok(())
}

/// Delete every account; chirps and refresh tokens go with them via ON DELETE CASCADE
pub async fn delete_all_users(pool: &SqlitePool) -> Result<u64, UserError> {
    let result = sqlx::query("DELETE FROM users").execute(pool).await?;
    Ok(result.rows_affected())
}
