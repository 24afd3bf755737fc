//! Access tokens: HS256-signed JWTs carrying the account id as `sub`.
//!
//! Tokens are stateless. Expiry is checked here against the caller's clock
//! with no leeway, so a token whose `exp` equals the current second is
//! already expired.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const ISSUER: &str = "chirpy";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Invalid token signature")]
    BadSignature,
    #[error("Token expired")]
    Expired,
    #[error("Token has no subject")]
    MissingSubject,
    #[error("Token signing failed: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue(subject: &Uuid, secret: &str, ttl: Duration) -> Result<String, TokenError> {
    issue_at(subject, secret, ttl, Utc::now())
}

/// `ttl` may be zero or negative, which yields a token that is already expired.
pub fn issue_at(
    subject: &Uuid,
    secret: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    let iat = now.timestamp();
    let claims = Claims {
        iss: ISSUER.to_string(),
        sub: Some(subject.to_string()),
        iat,
        exp: iat.saturating_add(ttl.num_seconds()),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

pub fn verify(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    verify_at(token, secret, Utc::now())
}

pub fn verify_at(token: &str, secret: &str, now: DateTime<Utc>) -> Result<Uuid, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is enforced below against `now` instead of the library's clock
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    })?;

    let claims = token_data.claims;
    if claims.exp <= now.timestamp() {
        return Err(TokenError::Expired);
    }

    match claims.sub.as_deref() {
        None | Some("") => Err(TokenError::MissingSubject),
        Some(sub) => Uuid::parse_str(sub).map_err(|_| TokenError::Malformed),
    }
}
