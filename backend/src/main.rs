use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;

use config::Config;
use services::metrics::HitCounter;

/// Origins must match a configured entry exactly, scheme and port included
fn is_allowed_origin(allowed_origins: &[String], origin: &str) -> bool {
    allowed_origins.iter().any(|allowed| allowed == origin)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    log::info!("Starting server at {}:{}", config.host, config.port);
    log::info!("Serving static files from: {}", config.fileserver_root);

    if config.polka_key.is_empty() {
        log::warn!("POLKA_KEY is not set, every webhook call will be rejected");
    }

    // Create database pool
    let pool = db::connect(&config.database_url)
        .await
        .expect("Failed to create database pool");

    // Run migrations
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    log::info!("Database migrations completed");

    // Create app state
    let app_state = web::Data::new(models::AppState {
        db: pool,
        config: config.clone(),
        file_server_hits: HitCounter::new(),
    });

    // Start HTTP server
    HttpServer::new(move || {
        let allowed_origins = app_state.config.cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                origin
                    .to_str()
                    .is_ok_and(|origin| is_allowed_origin(&allowed_origins, origin))
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["Authorization", "Content-Type"])
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .wrap(Logger::default())
            .wrap(cors)
            .service(handlers::file_server(app_state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
