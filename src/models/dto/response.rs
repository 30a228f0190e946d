use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponseDto {
    pub blob_url: String,
    pub filename: String,
    pub file_size: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFileResponseDto {
    pub extracted_text: String,
    pub content_length: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
    pub version: &'static str,
    pub services: ServiceStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub gemini: &'static str,
    pub storage: &'static str,
}

impl ServiceStatus {
    pub fn label(configured: bool) -> &'static str {
        if configured {
            "configured"
        } else {
            "missing"
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectivityResponse {
    pub status: &'static str,
    pub reachable: bool,
    pub model: String,
    pub message: String,
}
