use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use actix_web::{web, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::AppState;
use crate::services::session;

/// Extract the credential that follows `<scheme> ` in the Authorization header.
/// The scheme is matched case-sensitively with exactly one space after it.
fn authorization_credential<'a>(
    headers: &'a HeaderMap,
    scheme: &str,
) -> Result<&'a str, AuthMiddlewareError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthMiddlewareError::MissingToken)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthMiddlewareError::InvalidToken)?;

    match auth_str
        .strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix(' '))
    {
        Some(credential) if !credential.is_empty() => Ok(credential),
        _ => Err(AuthMiddlewareError::InvalidToken),
    }
}

/// `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthMiddlewareError> {
    authorization_credential(headers, "Bearer")
}

/// `Authorization: ApiKey <key>`
pub fn api_key(headers: &HeaderMap) -> Result<&str, AuthMiddlewareError> {
    authorization_credential(headers, "ApiKey")
}

/// Extract user ID from the Authorization header
pub fn extract_user_id(req: &HttpRequest, jwt_secret: &str) -> Result<Uuid, AuthMiddlewareError> {
    let token = bearer_token(req.headers())?;

    session::authenticate(token, jwt_secret).map_err(|e| {
        log::debug!("Access token rejected: {}", e);
        AuthMiddlewareError::InvalidToken
    })
}

/// The account behind a verified access token, handed to the handler as an argument.
/// Lives only as long as the request it was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            log::error!("AppState missing from app data");
            return ready(Err(AppError::Internal("Server misconfigured".to_string())));
        };

        ready(
            extract_user_id(req, &state.config.jwt_secret)
                .map(|user_id| AuthenticatedUser { user_id })
                .map_err(AppError::from),
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthMiddlewareError {
    MissingToken,
    InvalidToken,
}

impl std::fmt::Display for AuthMiddlewareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMiddlewareError::MissingToken => write!(f, "Missing authorization token"),
            AuthMiddlewareError::InvalidToken => write!(f, "Invalid authorization token"),
        }
    }
}

impl std::error::Error for AuthMiddlewareError {}
