use actix_web::{web, HttpResponse};
use serde::Deserialize;
use shared::{CreateChirpRequest, SortOrder, ValidateChirpResponse};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::AppState;
use crate::services::chirps as chirps_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/validate_chirp", web::post().to(validate_chirp))
        .service(
            web::scope("/chirps")
                .route("", web::get().to(list_chirps))
                .route("", web::post().to(create_chirp))
                .route("/{chirp_id}", web::get().to(get_chirp))
                .route("/{chirp_id}", web::delete().to(delete_chirp)),
        );
}

#[derive(Debug, Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::Validation("Invalid chirp ID, it must be a UUID".to_string()))
}

async fn validate_chirp(body: web::Json<CreateChirpRequest>) -> Result<HttpResponse, AppError> {
    let cleaned_body = chirps_service::clean_body(&body.body)?;

    Ok(HttpResponse::Ok().json(ValidateChirpResponse { cleaned_body }))
}

async fn create_chirp(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    body: web::Json<CreateChirpRequest>,
) -> Result<HttpResponse, AppError> {
    let chirp = chirps_service::create_chirp(&state.db, &auth.user_id, &body.body).await?;

    Ok(HttpResponse::Created().json(chirp))
}

async fn list_chirps(
    state: web::Data<AppState>,
    query: web::Query<ListChirpsQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();

    let author_id = match query.author_id.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| {
            AppError::Validation("Invalid author_id, it must be a UUID".to_string())
        })?),
    };

    let sort = match query.sort.as_deref() {
        None | Some("") => SortOrder::default(),
        Some(raw) => raw.parse().map_err(|_| {
            AppError::Validation("Invalid sort, expected 'asc' or 'desc'".to_string())
        })?,
    };

    let chirps = chirps_service::list_chirps(&state.db, author_id, sort).await?;

    Ok(HttpResponse::Ok().json(chirps))
}

async fn get_chirp(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path.into_inner())?;

    match chirps_service::get_chirp(&state.db, &chirp_id).await? {
        Some(chirp) => Ok(HttpResponse::Ok().json(chirp)),
        None => Err(AppError::NotFound("Chirp not found".to_string())),
    }
}

async fn delete_chirp(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path.into_inner())?;

    chirps_service::delete_chirp(&state.db, &chirp_id, &auth.user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
