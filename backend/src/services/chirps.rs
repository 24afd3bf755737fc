use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ChirpRow;
use shared::{Chirp, SortOrder};

/// Maximum chirp body length in bytes
pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const MASK: &str = "****";

#[derive(Debug, Error)]
pub enum ChirpError {
    #[error("Chirp is too long")]
    TooLong,
    #[error("Chirp not found")]
    NotFound,
    #[error("Permission denied")]
    PermissionDenied,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Validate the length of a chirp body and mask profane words.
pub fn clean_body(body: &str) -> Result<String, ChirpError> {
    if body.len() > MAX_CHIRP_LENGTH {
        return Err(ChirpError::TooLong);
    }

    Ok(mask_profanity(body))
}

/// Replace whole space-separated profane words, ignoring case.
/// Words with attached punctuation ("Sharbert!") are left alone.
pub fn mask_profanity(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if PROFANE_WORDS.iter().any(|p| word.eq_ignore_ascii_case(p)) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub async fn create_chirp(pool: &SqlitePool, user_id: &Uuid, body: &str) -> Result<Chirp, ChirpError> {
    let cleaned = clean_body(body)?;
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO chirps (id, created_at, updated_at, body, user_id)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(now)
    .bind(now)
    .bind(&cleaned)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(Chirp {
        id,
        created_at: now,
        updated_at: now,
        body: cleaned,
        user_id: *user_id,
    })
}

/// List chirps by creation time, optionally only those of one author
pub async fn list_chirps(
    pool: &SqlitePool,
    author_id: Option<Uuid>,
    sort: SortOrder,
) -> Result<Vec<Chirp>, ChirpError> {
    let query = format!(
        "SELECT * FROM chirps WHERE (? IS NULL OR user_id = ?) ORDER BY created_at {0}, rowid {0}",
        sort.as_sql()
    );

    let rows: Vec<ChirpRow> = sqlx::query_as(&query)
        .bind(author_id)
        .bind(author_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(|row| row.to_shared()).collect())
}

pub async fn get_chirp(pool: &SqlitePool, chirp_id: &Uuid) -> Result<Option<Chirp>, ChirpError> {
    let chirp: Option<ChirpRow> = sqlx::query_as("SELECT * FROM chirps WHERE id = ?")
        .bind(chirp_id)
        .fetch_optional(pool)
        .await?;

    Ok(chirp.map(|c| c.to_shared()))
}

pub async fn delete_chirp(pool: &SqlitePool, chirp_id: &Uuid, user_id: &Uuid) -> Result<(), ChirpError> {
    let chirp = get_chirp(pool, chirp_id).await?.ok_or(ChirpError::NotFound)?;

    // Check permission
    if chirp.user_id != *user_id {
        return Err(ChirpError::PermissionDenied);
    }

    sqlx::query("DELETE FROM chirps WHERE id = ?")
        .bind(chirp_id)
        .execute(pool)
        .await?;

    Ok(())
}
