use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Duration;
use shared::{LoginRequest, LoginResponse, RefreshResponse};

use crate::error::AppError;
use crate::middleware::auth::bearer_token;
use crate::models::AppState;
use crate::services::session;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(login))
        .route("/refresh", web::post().to(refresh))
        .route("/revoke", web::post().to(revoke));
}

async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let ttl = session::access_token_ttl(
        request.expires_in_seconds,
        state.config.access_token_ttl_seconds,
    );

    let session = session::login(
        &state.db,
        &request.email,
        &request.password,
        &state.config.jwt_secret,
        ttl,
    )
    .await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: session.user,
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// Trade the refresh token in the bearer header for a new access token
async fn refresh(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let refresh_token = bearer_token(req.headers())?;
    let ttl = Duration::seconds(state.config.access_token_ttl_seconds);

    let token = session::refresh(&state.db, refresh_token, &state.config.jwt_secret, ttl).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

async fn revoke(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let refresh_token = bearer_token(req.headers())?;

    session::revoke(&state.db, refresh_token).await?;

    Ok(HttpResponse::NoContent().finish())
}
