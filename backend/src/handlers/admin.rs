use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::models::AppState;
use crate::services::metrics::render_admin_page;
use crate::services::users as users_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(metrics))
        .route("/reset", web::post().to(reset));
}

async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_admin_page(state.file_server_hits.get()))
}

/// Wipe every account (and by cascade every chirp and refresh token) and zero the hit counter.
/// Only available when running on the dev platform.
async fn reset(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    if !state.config.is_dev() {
        log::warn!("Refused reset on platform {}", state.config.platform);
        return Err(AppError::Forbidden(
            "Reset is only allowed in dev environment".to_string(),
        ));
    }

    let deleted = users_service::delete_all_users(&state.db).await?;
    state.file_server_hits.reset();

    log::info!("Reset: deleted {} users", deleted);
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hits reset to 0"))
}
