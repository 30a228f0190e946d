pub mod generate_handler;
pub mod health_handler;
pub mod upload_handler;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::errors::AppError;

pub use generate_handler::generate_study_pack;
pub use health_handler::{connectivity_check, health_check};
pub use upload_handler::{process_file, upload_file};

/// Registers every API route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(generate_study_pack)
        .service(process_file)
        .service(health_check)
        .service(connectivity_check)
        .service(web::resource("/api/upload").route(web::post().to(upload_file)))
        .service(web::resource("/api/file-upload").route(web::post().to(upload_file)));
}

/// Fallback for unknown paths, so clients always get the JSON error shape.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(format!("{} {}", req.method(), req.path())))
}
