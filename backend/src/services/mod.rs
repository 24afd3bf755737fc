pub mod chirps;
pub mod metrics;
pub mod password;
pub mod refresh_tokens;
pub mod session;
pub mod tokens;
pub mod users;
