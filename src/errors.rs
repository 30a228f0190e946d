use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::services::{
    blob_store::BlobStoreError, generation_client::GenerationError,
    response_normalizer::ValidationError, text_extractor::ExtractionError,
};

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("{message}")]
    InputError {
        message: String,
        help: Option<String>,
    },

    #[error("{message}")]
    ExtractionError {
        message: String,
        help: Option<String>,
    },

    #[error("{0}")]
    RateLimited(String),

    #[error("{message}")]
    UpstreamConfig {
        message: String,
        help: Option<String>,
    },

    #[error("{0}")]
    UpstreamTimeout(String),

    #[error("{0}")]
    UpstreamMalformed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn input(message: impl Into<String>) -> Self {
        AppError::InputError {
            message: message.into(),
            help: None,
        }
    }

    pub fn input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        AppError::InputError {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn extraction(message: impl Into<String>, help: Option<String>) -> Self {
        AppError::ExtractionError {
            message: message.into(),
            help,
        }
    }

    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        AppError::UpstreamConfig {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn missing_api_key() -> Self {
        AppError::config(
            "AI service is not configured",
            "Set the GEMINI_API_KEY environment variable and restart the server",
        )
    }

    pub fn help(&self) -> Option<&str> {
        match self {
            AppError::InputError { help, .. }
            | AppError::ExtractionError { help, .. }
            | AppError::UpstreamConfig { help, .. } => help.as_deref(),
            AppError::RateLimited(_) => Some("Wait a few seconds and try again"),
            AppError::UpstreamTimeout(_) => Some("Try again with shorter content"),
            AppError::UpstreamMalformed(_) => Some("Try again, or rephrase or shorten your content"),
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InputError { .. } => "INPUT_ERROR",
            AppError::ExtractionError { .. } => "EXTRACTION_ERROR",
            AppError::RateLimited(_) => "UPSTREAM_RATE_LIMITED",
            AppError::UpstreamConfig { .. } => "UPSTREAM_CONFIG",
            AppError::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            AppError::UpstreamMalformed(_) => "UPSTREAM_MALFORMED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show a client. Internal details stay in the server log.
    fn public_message(&self) -> String {
        match self {
            AppError::InternalError(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    pub code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InputError { .. } => StatusCode::BAD_REQUEST,
            AppError::ExtractionError { .. } => StatusCode::BAD_REQUEST,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamConfig { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::UpstreamMalformed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::InternalError(detail) = self {
            log::error!("Internal error: {}", detail);
        }

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.public_message(),
            help: self.help().map(str::to_string),
            code: self.status_code().as_u16(),
        })
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingApiKey => AppError::missing_api_key(),
            GenerationError::RateLimited => AppError::RateLimited(
                "The AI service is temporarily busy. Please try again in a moment".to_string(),
            ),
            GenerationError::AuthOrQuota(detail) => {
                log::error!("Generation API rejected credentials: {}", detail);
                AppError::config(
                    "AI service is misconfigured",
                    "Check that GEMINI_API_KEY is valid and has access to the configured model",
                )
            }
            GenerationError::Timeout => AppError::UpstreamTimeout(
                "The AI service took too long to respond. Try again with shorter content".to_string(),
            ),
            GenerationError::EmptyResponse => AppError::UpstreamMalformed(
                "The AI service returned an empty response. Please try again".to_string(),
            ),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(_: ValidationError) -> Self {
        AppError::UpstreamMalformed(
            "The generated study material could not be processed. Please try again".to_string(),
        )
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::extraction(err.user_message(), Some(err.user_help().to_string()))
    }
}

impl From<BlobStoreError> for AppError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            BlobStoreError::NotConfigured => AppError::config(
                "File storage is not configured",
                "Set BLOB_STORE_URL and BLOB_READ_WRITE_TOKEN, or paste the text directly",
            ),
            BlobStoreError::NotFound(_) => AppError::input_with_help(
                "The referenced file could not be found",
                "Upload the file again and retry with the new URL",
            ),
            BlobStoreError::DownloadFailed(detail) => {
                log::warn!("Remote file download failed: {}", detail);
                AppError::input_with_help(
                    "The referenced file could not be downloaded",
                    "Check that the file URL is publicly accessible",
                )
            }
            BlobStoreError::Timeout => AppError::UpstreamTimeout(
                "File storage took too long to respond. Please try again".to_string(),
            ),
            BlobStoreError::TooLarge { limit } => AppError::input_with_help(
                format!(
                    "File too large; the maximum is {:.1} MB",
                    limit as f64 / (1024.0 * 1024.0)
                ),
                "Use a smaller document or paste the relevant text directly",
            ),
            BlobStoreError::UploadFailed(detail) => {
                AppError::InternalError(format!("upload failed: {}", detail))
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::input_with_help(
            format!("Invalid JSON body: {}", err),
            "Send a JSON object such as {\"notes\": \"...\"}",
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::input(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
