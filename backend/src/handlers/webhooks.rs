use actix_web::{web, HttpRequest, HttpResponse};
use shared::{WebhookRequest, USER_UPGRADED_EVENT};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::api_key;
use crate::models::AppState;
use crate::services::users as users_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/polka/webhooks", web::post().to(polka_webhook));
}

/// Byte comparison whose running time does not depend on where the inputs differ
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

/// Payment provider callback. The API key is checked before the body is looked at.
async fn polka_webhook(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let key = api_key(req.headers())?;
    if state.config.polka_key.is_empty()
        || !constant_time_eq(key.as_bytes(), state.config.polka_key.as_bytes())
    {
        log::warn!("Rejected webhook call with an unknown API key");
        return Err(AppError::Unauthorized);
    }

    let event: WebhookRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::Validation("Invalid request body".to_string()))?;

    if event.event != USER_UPGRADED_EVENT {
        log::debug!("Ignoring webhook event {}", event.event);
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = Uuid::parse_str(&event.data.user_id)
        .map_err(|_| AppError::Validation("Invalid user_id, it must be a UUID".to_string()))?;

    users_service::upgrade_user(&state.db, &user_id).await?;

    log::info!("Upgraded user {}", user_id);
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_helpers::{login, register, test_app, test_state, TEST_POLKA_KEY};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;
    use uuid::Uuid;

    #[::core::prelude::v1::test]
    fn test_constant_time_eq() {
        assert!(super::constant_time_eq(b"f271c81f", b"f271c81f"));
        assert!(!super::constant_time_eq(b"f271c81f", b"f271c81e"));
        assert!(!super::constant_time_eq(b"f271c81f", b"f271c81"));
        assert!(!super::constant_time_eq(b"f271c81f", b""));
        assert!(super::constant_time_eq(b"", b""));
    }

    #[actix_web::test]
    async fn test_key_prefix_is_rejected() {
        let state = test_state("dev").await;
        let app = test_app!(state);
        let user = register!(app, "a@x.com", "secret");

        let req = test::TestRequest::post()
            .uri("/api/polka/webhooks")
            .insert_header(("Authorization", format!("ApiKey {}", &TEST_POLKA_KEY[..16])))
            .set_json(upgrade_event(&user.id.to_string()))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    fn upgrade_event(user_id: &str) -> serde_json::Value {
        json!({ "event": "user.upgraded", "data": { "user_id": user_id } })
    }

    #[actix_web::test]
    async fn test_upgrade_user() {
        let state = test_state("dev").await;
        let app = test_app!(state);
        let user = register!(app, "a@x.com", "secret");

        let req = test::TestRequest::post()
            .uri("/api/polka/webhooks")
            .insert_header(("Authorization", format!("ApiKey {}", TEST_POLKA_KEY)))
            .set_json(upgrade_event(&user.id.to_string()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let session = login!(app, "a@x.com", "secret");
        assert!(session.user.is_upgraded);
    }

    #[actix_web::test]
    async fn test_wrong_or_missing_key() {
        let state = test_state("dev").await;
        let app = test_app!(state);
        let user = register!(app, "a@x.com", "secret");

        for header in [None, Some("ApiKey wrong"), Some("Bearer f271c81ff7084ee5b99a5091b42d486e")] {
            let mut req = test::TestRequest::post()
                .uri("/api/polka/webhooks")
                .set_json(upgrade_event(&user.id.to_string()));
            if let Some(value) = header {
                req = req.insert_header(("Authorization", value));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{:?}", header);
        }

        let session = login!(app, "a@x.com", "secret");
        assert!(!session.user.is_upgraded);
    }

    #[actix_web::test]
    async fn test_bad_key_wins_over_bad_body() {
        let state = test_state("dev").await;
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/polka/webhooks")
            .insert_header(("Authorization", "ApiKey wrong"))
            .insert_header(("Content-Type", "application/json"))
            .set_payload("not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_other_events_are_ignored() {
        let state = test_state("dev").await;
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/polka/webhooks")
            .insert_header(("Authorization", format!("ApiKey {}", TEST_POLKA_KEY)))
            .set_json(json!({ "event": "user.payment_failed", "data": { "user_id": "whatever" } }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn test_bad_payloads() {
        let state = test_state("dev").await;
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/polka/webhooks")
            .insert_header(("Authorization", format!("ApiKey {}", TEST_POLKA_KEY)))
            .set_payload("not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/polka/webhooks")
            .insert_header(("Authorization", format!("ApiKey {}", TEST_POLKA_KEY)))
            .set_json(upgrade_event("not-a-uuid"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/polka/webhooks")
            .insert_header(("Authorization", format!("ApiKey {}", TEST_POLKA_KEY)))
            .set_json(upgrade_event(&Uuid::new_v4().to_string()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
