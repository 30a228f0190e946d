use std::{env, str::FromStr, time::Duration};

use secrecy::SecretString;

use crate::services::content_analyzer::SizingPolicy;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const MAX_GENERATION_RETRIES: u32 = 5;

#[derive(Clone, Debug)]
pub struct Config {
    pub gemini_api_key: Option<SecretString>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub blob_store_url: Option<String>,
    pub blob_read_write_token: Option<SecretString>,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub environment: String,
    pub min_content_length: usize,
    pub max_content_length: usize,
    pub truncate_oversized: bool,
    pub sizing_policy: SizingPolicy,
    pub max_upload_bytes: usize,
    pub generation_timeout: Duration,
    pub generation_max_retries: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: non_empty_var("GEMINI_API_KEY").map(SecretString::from),
            gemini_model: non_empty_var("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: non_empty_var("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            blob_store_url: non_empty_var("BLOB_STORE_URL"),
            blob_read_write_token: non_empty_var("BLOB_READ_WRITE_TOKEN").map(SecretString::from),
            web_server_host: env::var("WEB_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_server_port: parse_var("PORT").unwrap_or(3001),
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            min_content_length: parse_var("MIN_CONTENT_LENGTH").unwrap_or(20),
            max_content_length: parse_var("MAX_CONTENT_LENGTH").unwrap_or(200_000),
            truncate_oversized: parse_var("TRUNCATE_OVERSIZED").unwrap_or(false),
            sizing_policy: parse_var("SIZING_POLICY").unwrap_or_default(),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES").unwrap_or(10 * 1024 * 1024),
            generation_timeout: Duration::from_secs(
                parse_var("GENERATION_TIMEOUT_SECS").unwrap_or(120),
            ),
            generation_max_retries: parse_var::<u32>("GENERATION_MAX_RETRIES")
                .unwrap_or(0)
                .min(MAX_GENERATION_RETRIES),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Logs a warning for every external service that is not configured.
    /// Missing services only disable the endpoints that need them.
    pub fn warn_missing_services(&self) {
        if self.gemini_api_key.is_none() {
            if self.is_production() {
                log::error!("GEMINI_API_KEY is not set in production; /api/generate is unavailable");
            } else {
                log::warn!("GEMINI_API_KEY is not set; /api/generate will fail until it is configured");
            }
        }
        if self.blob_store_url.is_none() || self.blob_read_write_token.is_none() {
            log::warn!("BLOB_STORE_URL or BLOB_READ_WRITE_TOKEN is not set; file uploads are disabled");
        }
        if self.min_content_length > self.max_content_length {
            log::warn!(
                "MIN_CONTENT_LENGTH ({}) exceeds MAX_CONTENT_LENGTH ({}); every request will be rejected",
                self.min_content_length,
                self.max_content_length
            );
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            gemini_api_key: Some(SecretString::from("test-gemini-key".to_string())),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: "http://127.0.0.1:9".to_string(),
            blob_store_url: Some("http://127.0.0.1:9/blob".to_string()),
            blob_read_write_token: Some(SecretString::from("test-blob-token".to_string())),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 3001,
            environment: "test".to_string(),
            min_content_length: 20,
            max_content_length: 200_000,
            truncate_oversized: false,
            sizing_policy: SizingPolicy::Adaptive,
            max_upload_bytes: 10 * 1024 * 1024,
            generation_timeout: Duration::from_secs(120),
            generation_max_retries: 0,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
