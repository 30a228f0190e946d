use actix_web::{http::header::CONTENT_TYPE, post, web, HttpRequest, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::get_request_id,
    models::dto::request::{normalize_mime, GenerateRequestDto},
};

#[post("/api/generate")]
pub async fn generate_study_pack(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let request_id = get_request_id(&req).unwrap_or_default();
    check_json_content_type(&req)?;

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::input_with_help(
            "No content provided",
            "Send a JSON body such as {\"notes\": \"...\"}",
        ));
    }

    let dto: GenerateRequestDto = serde_json::from_slice(&body)?;
    let input = dto.into_raw_input()?;

    log::info!(
        "request_id={} generate: {} input, {} body bytes",
        request_id,
        input.kind(),
        body.len()
    );

    let pack = state.study_pack_service.handle(input).await.map_err(|e| {
        log::warn!("request_id={} generate failed: {}", request_id, e);
        e
    })?;

    Ok(HttpResponse::Ok().json(pack))
}

/// Multipart bodies are refused with directions to the upload flow; any other
/// non-JSON type is an input error. A missing header is read as JSON.
fn check_json_content_type(req: &HttpRequest) -> Result<(), AppError> {
    let Some(content_type) = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(normalize_mime)
    else {
        return Ok(());
    };

    match content_type.as_str() {
        "application/json" => Ok(()),
        "multipart/form-data" => Err(AppError::input_with_help(
            "Direct file uploads are not supported on this endpoint",
            "Upload the file to /api/upload first, then send {\"fileURL\": \"<blobUrl>\"} as JSON",
        )),
        other => Err(AppError::input_with_help(
            format!("Unsupported content type: {}", other),
            "Send the request with Content-Type: application/json",
        )),
    }
}
