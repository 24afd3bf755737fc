use actix_files::Files;
use actix_web::dev::{HttpServiceFactory, Service as _};
use actix_web::web;

use crate::error::AppError;
use crate::models::AppState;

pub mod admin;
pub mod auth;
pub mod chirps;
pub mod health;
pub mod users;
pub mod webhooks;

#[cfg(test)]
pub(crate) mod test_helpers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::scope("/api")
                .configure(health::configure)
                .configure(users::configure)
                .configure(auth::configure)
                .configure(chirps::configure)
                .configure(webhooks::configure),
        )
        .service(web::scope("/admin").configure(admin::configure));
}

/// Static site under `/app`, counting every request it serves
pub fn file_server(state: web::Data<AppState>) -> impl HttpServiceFactory {
    let root = state.config.fileserver_root.clone();

    web::scope("/app")
        .wrap_fn(move |req, srv| {
            state.file_server_hits.increment();
            srv.call(req)
        })
        .service(Files::new("/", root).index_file("index.html"))
}

/// Malformed JSON bodies get the same `{"error": ...}` envelope as every other failure
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected request body: {}", err);
        AppError::Validation("Invalid request body".to_string()).into()
    })
}
