use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

const STUDY_PACK_TIMEOUT: u64 = 120;
const CONNECTIVITY_TIMEOUT: u64 = 10;

/// Decoding parameters and deadline for a single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
    pub timeout: Duration,
    pub json_output: bool,
}

impl GenerationOptions {
    pub fn study_pack() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 8192,
            top_p: 0.95,
            top_k: 40,
            timeout: Duration::from_secs(STUDY_PACK_TIMEOUT),
            json_output: true,
        }
    }

    pub fn connectivity_check() -> Self {
        Self {
            temperature: 0.0,
            max_output_tokens: 16,
            top_p: 1.0,
            top_k: 1,
            timeout: Duration::from_secs(CONNECTIVITY_TIMEOUT),
            json_output: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation API key is not configured")]
    MissingApiKey,
    #[error("generation API rate limit or quota exhausted")]
    RateLimited,
    #[error("generation API rejected the credentials: {0}")]
    AuthOrQuota(String),
    #[error("generation API call timed out")]
    Timeout,
    #[error("generation API returned no text")]
    EmptyResponse,
    #[error("generation API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("generation API transport error: {0}")]
    Transport(String),
}

impl GenerationError {
    /// Errors a caller may reasonably retry after a pause.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::RateLimited | GenerationError::Timeout)
    }
}

/// One attempt per call; retrying is left to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationClient: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError>;
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiApiRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize, Debug)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug, Default)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiApiResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Maps a non-success HTTP status from the generation API to an error.
pub fn classify_status(status: StatusCode, body: &str) -> GenerationError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited,
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
            GenerationError::AuthOrQuota(truncate_body(body))
        }
        // An invalid key is reported as 400 with a dedicated reason.
        StatusCode::BAD_REQUEST
            if body.contains("API_KEY_INVALID") || body.contains("API key not valid") =>
        {
            GenerationError::AuthOrQuota(truncate_body(body))
        }
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => GenerationError::Timeout,
        other => GenerationError::Http {
            status: other.as_u16(),
            body: truncate_body(body),
        },
    }
}

fn truncate_body(body: &str) -> String {
    body.chars().take(300).collect()
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_ref().ok_or(GenerationError::MissingApiKey)?;

        let request = GeminiApiRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_k: options.top_k,
                top_p: options.top_p,
                max_output_tokens: options.max_output_tokens,
                response_mime_type: options.json_output.then_some("application/json"),
            },
        };

        log::info!(
            "Calling generation API model={} prompt_chars={} timeout={:?}",
            self.model,
            prompt.len(),
            options.timeout
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key.expose_secret())
            .timeout(options.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout
                } else {
                    GenerationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::Transport(e.to_string())
            }
        })?;

        if !status.is_success() {
            let err = classify_status(status, &body);
            log::warn!("Generation API call failed: {}", err);
            return Err(err);
        }

        let parsed: GeminiApiResponse = serde_json::from_str(&body).unwrap_or_default();
        let text = parsed.into_text().ok_or(GenerationError::EmptyResponse)?;

        log::info!("Generation API returned {} characters", text.len());
        Ok(text)
    }
}
