use sqlx::SqlitePool;

use crate::config::Config;
use crate::services::metrics::HitCounter;

pub mod chirp;
pub mod refresh_token;
pub mod user;

pub use chirp::*;
pub use refresh_token::*;
pub use user::*;

/// Application state shared across all handlers
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub file_server_hits: HitCounter,
}
