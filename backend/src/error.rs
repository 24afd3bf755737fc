use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use shared::ApiError;
use thiserror::Error;

use crate::middleware::auth::AuthMiddlewareError;
use crate::services::chirps::ChirpError;
use crate::services::password::PasswordError;
use crate::services::session::SessionError;
use crate::services::users::UserError;

/// Every failure leaves a handler as exactly one of these kinds.
/// Only the message is sent to the client; causes are logged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn internal(context: &str, cause: impl std::fmt::Debug) -> Self {
        log::error!("{}: {:?}", context, cause);
        AppError::Internal(context.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiError::new(self.to_string()))
    }
}

impl From<AuthMiddlewareError> for AppError {
    fn from(e: AuthMiddlewareError) -> Self {
        log::debug!("Rejected credential: {}", e);
        AppError::Unauthorized
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::Mismatch => AppError::Unauthorized,
            PasswordError::Hashing => AppError::internal("Error hashing password", e),
        }
    }
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::UserAlreadyExists => {
                AppError::Validation("Email is already registered".to_string())
            }
            UserError::UserNotFound => AppError::NotFound("User not found".to_string()),
            UserError::DatabaseError(e) => AppError::internal("Database error", e),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::UserNotFound => AppError::NotFound("User not found".to_string()),
            SessionError::InvalidCredentials | SessionError::InvalidRefreshToken => {
                AppError::Unauthorized
            }
            SessionError::TokenError(e) => AppError::internal("Error creating token", e),
            SessionError::RefreshTokenError(e) => {
                AppError::internal("Error creating refresh token", e)
            }
            SessionError::UserError(e) => e.into(),
        }
    }
}

impl From<ChirpError> for AppError {
    fn from(e: ChirpError) -> Self {
        match e {
            ChirpError::TooLong => AppError::Validation(e.to_string()),
            ChirpError::NotFound => AppError::NotFound(e.to_string()),
            ChirpError::PermissionDenied => {
                AppError::Forbidden("You can only delete your own chirps".to_string())
            }
            ChirpError::DatabaseError(e) => AppError::internal("Database error", e),
        }
    }
}
