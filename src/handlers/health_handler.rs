use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::response::{HealthResponse, ServiceStatus},
};

#[get("/api/health")]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        environment: state.config.environment.clone(),
        version: env!("CARGO_PKG_VERSION"),
        services: ServiceStatus {
            gemini: ServiceStatus::label(state.study_pack_service.is_generation_configured()),
            storage: ServiceStatus::label(state.upload_service.is_storage_configured()),
        },
    })
}

/// Makes one small live call to the generation API.
#[get("/api/test")]
pub async fn connectivity_check(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let response = state.study_pack_service.check_connectivity().await?;
    log::info!("Generation API reachable (model {})", response.model);
    Ok(HttpResponse::Ok().json(response))
}
