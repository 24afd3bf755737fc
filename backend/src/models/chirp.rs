use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for chirps
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChirpRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

impl ChirpRow {
    pub fn to_shared(&self) -> shared::Chirp {
        shared::Chirp {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            body: self.body.clone(),
            user_id: self.user_id,
        }
    }
}
