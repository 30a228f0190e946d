use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::dto::{
        request::{
            ensure_http_url, ensure_supported_type, mime_from_path, normalize_mime,
            unsupported_type, ProcessFileRequestDto,
        },
        response::{ProcessFileResponseDto, UploadResponseDto},
    },
    services::{blob_store::BlobStore, text_extractor::TextExtractor},
};

pub const MIN_EXTRACTED_LENGTH: usize = 50;

const GENERIC_BINARY: &str = "application/octet-stream";

pub struct UploadService {
    blob_store: Arc<dyn BlobStore>,
    text_extractor: Arc<dyn TextExtractor>,
    max_upload_bytes: usize,
}

impl UploadService {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        text_extractor: Arc<dyn TextExtractor>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            blob_store,
            text_extractor,
            max_upload_bytes,
        }
    }

    pub fn is_storage_configured(&self) -> bool {
        self.blob_store.is_configured()
    }

    /// Validates an uploaded document and stores it. Nothing reaches storage
    /// unless the name, type and size checks pass.
    pub async fn upload(
        &self,
        filename: Option<&str>,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> AppResult<UploadResponseDto> {
        let filename = filename
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| {
                AppError::input_with_help(
                    "Missing file name",
                    "Send the original file name in the X-Filename header",
                )
            })?;

        let mime_type = resolve_upload_mime(filename, content_type)?;
        self.check_size(data.len())?;

        if !self.blob_store.is_configured() {
            return Err(AppError::config(
                "File storage is not configured",
                "Set BLOB_STORE_URL and BLOB_READ_WRITE_TOKEN, or paste the text directly",
            ));
        }

        let file_size = data.len();
        let stored = self.blob_store.upload(filename, &mime_type, data).await?;
        log::info!("Uploaded {} ({} bytes, {})", stored.pathname, file_size, mime_type);

        Ok(UploadResponseDto {
            blob_url: stored.url,
            filename: filename.to_string(),
            file_size,
        })
    }

    /// Downloads a stored document and returns its text.
    pub async fn process_file(
        &self,
        request: ProcessFileRequestDto,
    ) -> AppResult<ProcessFileResponseDto> {
        request.validate()?;
        ensure_http_url(&request.blob_url)?;

        let mime_type = normalize_mime(&request.mime_type);
        ensure_supported_type(&mime_type)?;

        let data = self.blob_store.fetch(&request.blob_url).await?;
        let text = self.text_extractor.extract(data, &mime_type).await?;

        let content_length = text.chars().count();
        if content_length < MIN_EXTRACTED_LENGTH {
            return Err(AppError::extraction(
                format!(
                    "Only {} characters of text were found; at least {} are required",
                    content_length, MIN_EXTRACTED_LENGTH
                ),
                Some("Upload a longer document or paste the text directly".to_string()),
            ));
        }

        Ok(ProcessFileResponseDto {
            extracted_text: text,
            content_length,
        })
    }

    pub fn check_size(&self, size: usize) -> AppResult<()> {
        if size == 0 {
            return Err(AppError::input("The uploaded file is empty"));
        }
        if size > self.max_upload_bytes {
            return Err(AppError::input_with_help(
                format!(
                    "File too large ({:.1} MB); the maximum is {:.1} MB",
                    megabytes(size),
                    megabytes(self.max_upload_bytes)
                ),
                "Compress the document or paste the relevant text directly",
            ));
        }
        Ok(())
    }
}

/// Uses the declared content type, falling back to the file extension when
/// the client sent a generic binary type or none at all.
fn resolve_upload_mime(filename: &str, content_type: Option<&str>) -> AppResult<String> {
    let declared = content_type
        .map(normalize_mime)
        .filter(|m| !m.is_empty() && m != GENERIC_BINARY);

    let mime_type = match declared {
        Some(mime) => mime,
        None => mime_from_path(filename).ok_or_else(|| unsupported_type(GENERIC_BINARY))?,
    };

    ensure_supported_type(&mime_type)?;
    Ok(mime_type)
}

fn megabytes(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
