use actix_web::web;

use crate::config::Config;
use crate::db::test_pool;
use crate::models::AppState;
use crate::services::metrics::HitCounter;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

pub async fn test_state(platform: &str) -> web::Data<AppState> {
    web::Data::new(AppState {
        db: test_pool().await,
        config: Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: TEST_SECRET.to_string(),
            access_token_ttl_seconds: 3600,
            platform: platform.to_string(),
            polka_key: TEST_POLKA_KEY.to_string(),
            fileserver_root: concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string(),
            cors_origins: Vec::new(),
        },
        file_server_hits: HitCounter::new(),
    })
}

/// Initialise the full route table against `state`
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .service(crate::handlers::file_server($state.clone()))
                .configure(crate::handlers::configure_routes),
        )
        .await
    };
}

/// Create an account through the API and return it
macro_rules! register {
    ($app:expr, $email:expr, $password:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/users")
            .set_json(serde_json::json!({ "email": $email, "password": $password }))
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let user: shared::User = actix_web::test::read_body_json(resp).await;
        user
    }};
}

/// Log in through the API and return the token pair
macro_rules! login {
    ($app:expr, $email:expr, $password:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/login")
            .set_json(serde_json::json!({ "email": $email, "password": $password }))
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        let session: shared::LoginResponse = actix_web::test::read_body_json(resp).await;
        session
    }};
}

pub(crate) use {login, register, test_app};
