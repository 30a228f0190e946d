use actix_web::{http::header::CONTENT_TYPE, post, web, HttpRequest, HttpResponse};
use futures::StreamExt;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::request::ProcessFileRequestDto,
};

pub const FILENAME_HEADER: &str = "x-filename";

/// Raw-body upload. Registered under both `/api/upload` and `/api/file-upload`.
pub async fn upload_file(
    state: web::Data<AppState>,
    req: HttpRequest,
    mut payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let filename = header(FILENAME_HEADER).map(|f| decode_filename(&f));
    let content_type = header(CONTENT_TYPE.as_str());

    let mut data = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::input(format!("Failed to read upload: {}", e)))?;
        data.extend_from_slice(&chunk);
        // Stop reading as soon as the ceiling is crossed.
        state.upload_service.check_size(data.len())?;
    }

    let response = state
        .upload_service
        .upload(filename.as_deref(), content_type.as_deref(), data)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/process-file")]
pub async fn process_file(
    state: web::Data<AppState>,
    request: web::Json<ProcessFileRequestDto>,
) -> Result<HttpResponse, AppError> {
    let response = state.upload_service.process_file(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Browsers send non-ASCII names percent-encoded in `X-Filename`.
fn decode_filename(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
