use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl_seconds: i64,
    /// Deployment platform; destructive admin endpoints only run on "dev"
    pub platform: String,
    pub polka_key: String,
    pub fileserver_root: String,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", "8080")?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:chirpy.db?mode=rwc".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "development-secret-key-change-in-production".to_string()),
            access_token_ttl_seconds: parse_var("ACCESS_TOKEN_TTL_SECONDS", "3600")?,
            platform: env::var("PLATFORM").unwrap_or_else(|_| "production".to_string()),
            polka_key: env::var("POLKA_KEY").unwrap_or_default(),
            fileserver_root: env::var("FILESERVER_ROOT").unwrap_or_else(|_| "./static".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| vec!["http://localhost".to_string()]),
        })
    }

    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(var).unwrap_or_else(|_| default.to_string());
    value
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { var, value })
}
