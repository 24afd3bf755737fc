use actix_web::{web, HttpResponse};
use shared::{CreateUserRequest, UpdateUserRequest};

use crate::error::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::AppState;
use crate::services::{password, users as users_service};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::post().to(create_user))
            .route("", web::put().to(update_user)),
    );
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    Ok(())
}

async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    validate_credentials(&request.email, &request.password)?;

    let password_hash = password::hash_password(&request.password)?;
    let user = users_service::create_user(&state.db, &request.email, &password_hash).await?;

    log::info!("Created user {}", user.id);
    Ok(HttpResponse::Created().json(user))
}

/// Replace the caller's own email and password
async fn update_user(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    validate_credentials(&request.email, &request.password)?;

    let password_hash = password::hash_password(&request.password)?;
    let user =
        users_service::update_user(&state.db, &auth.user_id, &request.email, &password_hash)
            .await?;

    Ok(HttpResponse::Ok().json(user))
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_helpers::{login, register, test_app, test_state};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;
    use shared::{ApiError, User};

    #[actix_web::test]
    async fn test_create_user() {
        let state = test_state("dev").await;
        let app = test_app!(state);

        let user = register!(app, "a@x.com", "secret");

        assert_eq!(user.email, "a@x.com");
        assert!(!user.is_upgraded);
    }

    #[actix_web::test]
    async fn test_create_user_requires_fields() {
        let state = test_state("dev").await;
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/users")
            .set_json(json!({ "email": "", "password": "secret" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/users")
            .set_json(json!({ "email": "a@x.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ApiError = test::read_body_json(resp).await;
        assert_eq!(body.error, "Invalid request body");
    }

    #[actix_web::test]
    async fn test_create_duplicate_user() {
        let state = test_state("dev").await;
        let app = test_app!(state);
        register!(app, "a@x.com", "secret");

        let req = test::TestRequest::post()
            .uri("/api/users")
            .set_json(json!({ "email": "a@x.com", "password": "other" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_update_own_user() {
        let state = test_state("dev").await;
        let app = test_app!(state);
        let user = register!(app, "a@x.com", "secret");
        let session = login!(app, "a@x.com", "secret");

        let req = test::TestRequest::put()
            .uri("/api/users")
            .insert_header(("Authorization", format!("Bearer {}", session.token)))
            .set_json(json!({ "email": "b@x.com", "password": "new-secret" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated: User = test::read_body_json(resp).await;
        assert_eq!(updated.id, user.id);
        assert_eq!(updated.email, "b@x.com");

        let relogin = login!(app, "b@x.com", "new-secret");
        assert_eq!(relogin.user.id, user.id);
    }

    #[actix_web::test]
    async fn test_update_user_requires_token() {
        let state = test_state("dev").await;
        let app = test_app!(state);

        let req = test::TestRequest::put()
            .uri("/api/users")
            .set_json(json!({ "email": "b@x.com", "password": "new-secret" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ApiError = test::read_body_json(resp).await;
        assert_eq!(body.error, "Unauthorized");
    }
}
