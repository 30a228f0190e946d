use std::{sync::Arc, time::Duration};

use crate::{
    config::Config,
    constants::prompts::{CONNECTIVITY_PROMPT, TRUNCATION_NOTE},
    errors::{AppError, AppResult},
    models::{
        domain::{RawInput, StudyPack},
        dto::{request::ensure_supported_type, response::ConnectivityResponse},
    },
    services::{
        blob_store::BlobStore,
        content_analyzer::{analyze_with, SizingPolicy},
        generation_client::{GenerationClient, GenerationError, GenerationOptions},
        prompt_builder::build_prompt,
        response_normalizer::normalize,
        text_extractor::TextExtractor,
    },
};

const TRUNCATION_KEEP_RATIO: f64 = 0.7;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ContentPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub truncate_oversized: bool,
    pub sizing_policy: SizingPolicy,
    pub generation_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl From<&Config> for ContentPolicy {
    fn from(config: &Config) -> Self {
        Self {
            min_length: config.min_content_length,
            max_length: config.max_content_length,
            truncate_oversized: config.truncate_oversized,
            sizing_policy: config.sizing_policy,
            generation_timeout: config.generation_timeout,
            max_retries: config.generation_max_retries,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Runs one generation request end to end: resolve content, check its length,
/// analyze, prompt, generate and validate. Every failure surfaces as a single
/// `AppError`; nothing is retried unless `max_retries` allows it.
pub struct StudyPackService {
    generation_client: Arc<dyn GenerationClient>,
    blob_store: Arc<dyn BlobStore>,
    text_extractor: Arc<dyn TextExtractor>,
    policy: ContentPolicy,
    model: String,
}

impl StudyPackService {
    pub fn new(
        generation_client: Arc<dyn GenerationClient>,
        blob_store: Arc<dyn BlobStore>,
        text_extractor: Arc<dyn TextExtractor>,
        policy: ContentPolicy,
        model: impl Into<String>,
    ) -> Self {
        Self {
            generation_client,
            blob_store,
            text_extractor,
            policy,
            model: model.into(),
        }
    }

    pub fn is_generation_configured(&self) -> bool {
        self.generation_client.is_configured()
    }

    pub async fn handle(&self, input: RawInput) -> AppResult<StudyPack> {
        if !self.generation_client.is_configured() {
            return Err(AppError::missing_api_key());
        }

        log::info!("Generating study pack from {} input", input.kind());

        let text = self.resolve_content(input).await?;
        let content = prepare_content(&text, &self.policy)?;

        let analysis = analyze_with(&content, self.policy.sizing_policy);
        log::info!(
            "Content analysis: words={} sentences={} lines={} keywords={} type={} complexity={} flashcards={} quiz={}",
            analysis.word_count,
            analysis.sentence_count,
            analysis.line_count,
            analysis.keyword_hits,
            analysis.content_type,
            analysis.complexity,
            analysis.target_flashcard_count,
            analysis.target_quiz_count
        );

        let prompt = build_prompt(&content, &analysis);
        let options = GenerationOptions::study_pack().with_timeout(self.policy.generation_timeout);
        let raw = self.generate_with_retry(&prompt, &options).await?;

        let pack = normalize(&raw).map_err(|e| {
            log::warn!("Rejected model output ({} chars): {}", raw.len(), e);
            AppError::from(e)
        })?;

        log::info!(
            "Study pack ready: {} flashcards, {} quiz questions",
            pack.flashcards.len(),
            pack.quiz.len()
        );
        Ok(pack)
    }

    /// Issues a minimal live call to confirm the generation API is reachable.
    pub async fn check_connectivity(&self) -> AppResult<ConnectivityResponse> {
        if !self.generation_client.is_configured() {
            return Err(AppError::missing_api_key());
        }

        let reply = self
            .generation_client
            .generate(CONNECTIVITY_PROMPT, &GenerationOptions::connectivity_check())
            .await?;

        Ok(ConnectivityResponse {
            status: "ok",
            reachable: true,
            model: self.model.clone(),
            message: reply.trim().chars().take(100).collect(),
        })
    }

    async fn resolve_content(&self, input: RawInput) -> AppResult<String> {
        match input {
            RawInput::Text(text) => Ok(text),
            RawInput::FileReference { url, mime_type } => {
                ensure_supported_type(&mime_type)?;
                let data = self.blob_store.fetch(&url).await?;
                let text = self.text_extractor.extract(data, &mime_type).await?;
                log::info!("Extracted {} characters from {}", text.len(), mime_type);
                Ok(text)
            }
        }
    }

    async fn generate_with_retry(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        let mut attempt = 0;
        loop {
            match self.generation_client.generate(prompt, options).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && attempt < self.policy.max_retries => {
                    let delay = backoff_delay(self.policy.retry_delay, attempt);
                    attempt += 1;
                    log::warn!(
                        "Generation attempt {} failed ({}); retrying in {:?}",
                        attempt,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Exponential backoff from `base`, doubling per attempt and capped at one minute.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_RETRY_DELAY)
}

/// Trims the content and enforces the length policy, truncating oversized
/// content when the policy allows it.
pub fn prepare_content(text: &str, policy: &ContentPolicy) -> AppResult<String> {
    let trimmed = text.trim();
    let length = trimmed.chars().count();

    if length < policy.min_length {
        return Err(AppError::input_with_help(
            format!(
                "Content is too short ({} characters); at least {} characters are required",
                length, policy.min_length
            ),
            "Add more material so there is enough to build a summary and questions from",
        ));
    }

    if length <= policy.max_length {
        return Ok(trimmed.to_string());
    }

    if !policy.truncate_oversized {
        return Err(AppError::input_with_help(
            format!(
                "Content is too long ({} characters); the maximum is {} characters",
                length, policy.max_length
            ),
            "Split the material into smaller sections and generate them separately",
        ));
    }

    let keep = (policy.max_length as f64 * TRUNCATION_KEEP_RATIO) as usize;
    log::warn!("Truncating content from {} to {} characters", length, keep);

    let mut truncated: String = trimmed.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_NOTE);
    Ok(truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::{
            blob_store::{BlobStoreError, MockBlobStore},
            generation_client::MockGenerationClient,
            text_extractor::{ExtractionError, MockTextExtractor},
        },
        test_utils::fixtures::{photosynthesis_text, valid_study_pack_json},
    };
    use actix_web::{http::StatusCode, ResponseError};
    use mockall::predicate::eq;

    fn policy() -> ContentPolicy {
        ContentPolicy {
            retry_delay: Duration::from_millis(1),
            ..ContentPolicy::from(&Config::test_config())
        }
    }

    fn configured_client() -> MockGenerationClient {
        let mut client = MockGenerationClient::new();
        client.expect_is_configured().return_const(true);
        client
    }

    fn service(
        client: MockGenerationClient,
        store: MockBlobStore,
        extractor: MockTextExtractor,
        policy: ContentPolicy,
    ) -> StudyPackService {
        StudyPackService::new(
            Arc::new(client),
            Arc::new(store),
            Arc::new(extractor),
            policy,
            "test-model",
        )
    }

    #[test]
    fn test_content_at_minimum_length_is_accepted() {
        let mut policy = policy();
        policy.min_length = 50;

        let exact = "a".repeat(50);
        assert_eq!(prepare_content(&exact, &policy).unwrap(), exact);

        let short = "a".repeat(49);
        let err = prepare_content(&short, &policy).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_length_is_measured_after_trimming() {
        let padded = format!("   {}   ", "b".repeat(19));
        assert!(prepare_content(&padded, &policy()).is_err());
    }

    #[test]
    fn test_oversized_content_is_rejected_by_default() {
        let mut policy = policy();
        policy.max_length = 100;

        let err = prepare_content(&"c".repeat(101), &policy).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn test_oversized_content_is_truncated_when_enabled() {
        let mut policy = policy();
        policy.max_length = 100;
        policy.truncate_oversized = true;

        let prepared = prepare_content(&"é".repeat(150), &policy).unwrap();
        assert!(prepared.starts_with(&"é".repeat(70)));
        assert!(!prepared.starts_with(&"é".repeat(71)));
        assert!(prepared.ends_with(TRUNCATION_NOTE));
    }

    #[actix_web::test]
    async fn test_text_input_produces_study_pack() {
        let mut client = configured_client();
        client
            .expect_generate()
            .withf(|prompt, options| prompt.contains("Photosynthesis") && options.json_output)
            .times(1)
            .returning(|_, _| Ok(format!("```json\n{}\n```", valid_study_pack_json())));

        let service = service(client, MockBlobStore::new(), MockTextExtractor::new(), policy());
        let pack = service
            .handle(RawInput::Text(photosynthesis_text()))
            .await
            .unwrap();

        assert!(!pack.flashcards.is_empty());
        assert!(!pack.quiz.is_empty());
    }

    #[actix_web::test]
    async fn test_missing_api_key_fails_before_any_call() {
        let mut client = MockGenerationClient::new();
        client.expect_is_configured().return_const(false);
        client.expect_generate().never();

        let service = service(client, MockBlobStore::new(), MockTextExtractor::new(), policy());
        let err = service
            .handle(RawInput::Text(photosynthesis_text()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UpstreamConfig { .. }));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_short_text_never_reaches_the_model() {
        let mut client = configured_client();
        client.expect_generate().never();

        let service = service(client, MockBlobStore::new(), MockTextExtractor::new(), policy());
        let err = service
            .handle(RawInput::Text("too short".to_string()))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_rate_limit_is_surfaced_without_retry() {
        let mut client = configured_client();
        client
            .expect_generate()
            .times(1)
            .returning(|_, _| Err(GenerationError::RateLimited));

        let service = service(client, MockBlobStore::new(), MockTextExtractor::new(), policy());
        let err = service
            .handle(RawInput::Text(photosynthesis_text()))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[actix_web::test]
    async fn test_bounded_retry_recovers_from_timeout() {
        let mut client = configured_client();
        let mut seq = mockall::Sequence::new();
        client
            .expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(GenerationError::Timeout));
        client
            .expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(valid_study_pack_json()));

        let mut policy = policy();
        policy.max_retries = 1;

        let service = service(client, MockBlobStore::new(), MockTextExtractor::new(), policy);
        assert!(service
            .handle(RawInput::Text(photosynthesis_text()))
            .await
            .is_ok());
    }

    #[actix_web::test]
    async fn test_auth_failure_is_not_retried() {
        let mut client = configured_client();
        client
            .expect_generate()
            .times(1)
            .returning(|_, _| Err(GenerationError::AuthOrQuota("forbidden".to_string())));

        let mut policy = policy();
        policy.max_retries = 3;

        let service = service(client, MockBlobStore::new(), MockTextExtractor::new(), policy);
        let err = service
            .handle(RawInput::Text(photosynthesis_text()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UpstreamConfig { .. }));
    }

    #[actix_web::test]
    async fn test_timeout_maps_to_gateway_timeout() {
        let mut client = configured_client();
        client
            .expect_generate()
            .returning(|_, _| Err(GenerationError::Timeout));

        let service = service(client, MockBlobStore::new(), MockTextExtractor::new(), policy());
        let err = service
            .handle(RawInput::Text(photosynthesis_text()))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert!(err.to_string().contains("shorter content"));
    }

    #[actix_web::test]
    async fn test_malformed_model_output_maps_to_upstream_malformed() {
        let mut client = configured_client();
        client
            .expect_generate()
            .returning(|_, _| Ok("I cannot help with that.".to_string()));

        let service = service(client, MockBlobStore::new(), MockTextExtractor::new(), policy());
        let err = service
            .handle(RawInput::Text(photosynthesis_text()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UpstreamMalformed(_)));
    }

    #[actix_web::test]
    async fn test_file_reference_is_fetched_and_extracted() {
        let url = "https://blob.example.com/lecture.pdf";

        let mut store = MockBlobStore::new();
        store
            .expect_fetch()
            .with(eq(url))
            .times(1)
            .returning(|_| Ok(b"%PDF-1.7 ...".to_vec()));

        let mut extractor = MockTextExtractor::new();
        extractor
            .expect_extract()
            .withf(|_, mime| mime == "application/pdf")
            .times(1)
            .returning(|_, _| Ok(photosynthesis_text()));

        let mut client = configured_client();
        client
            .expect_generate()
            .times(1)
            .returning(|_, _| Ok(valid_study_pack_json()));

        let service = service(client, store, extractor, policy());
        let pack = service
            .handle(RawInput::FileReference {
                url: url.to_string(),
                mime_type: "application/pdf".to_string(),
            })
            .await
            .unwrap();

        assert!(!pack.quiz.is_empty());
    }

    #[actix_web::test]
    async fn test_extraction_failure_stops_the_pipeline() {
        let mut store = MockBlobStore::new();
        store.expect_fetch().returning(|_| Ok(vec![0u8; 8]));

        let mut extractor = MockTextExtractor::new();
        extractor
            .expect_extract()
            .returning(|_, _| Err(ExtractionError::PasswordProtected));

        let mut client = configured_client();
        client.expect_generate().never();

        let service = service(client, store, extractor, policy());
        let err = service
            .handle(RawInput::FileReference {
                url: "https://blob.example.com/secret.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ExtractionError { .. }));
        assert!(err.to_string().contains("password"));
    }

    #[actix_web::test]
    async fn test_missing_remote_file_is_an_input_error() {
        let mut store = MockBlobStore::new();
        store
            .expect_fetch()
            .returning(|url| Err(BlobStoreError::NotFound(url.to_string())));

        let service = service(configured_client(), store, MockTextExtractor::new(), policy());
        let err = service
            .handle(RawInput::FileReference {
                url: "https://blob.example.com/gone.txt".to_string(),
                mime_type: "text/plain".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_connectivity_check_reports_model() {
        let mut client = configured_client();
        client
            .expect_generate()
            .withf(|prompt, options| prompt == CONNECTIVITY_PROMPT && !options.json_output)
            .returning(|_, _| Ok("OK\n".to_string()));

        let service = service(client, MockBlobStore::new(), MockTextExtractor::new(), policy());
        let response = service.check_connectivity().await.unwrap();

        assert!(response.reachable);
        assert_eq!(response.model, "test-model");
        assert_eq!(response.message, "OK");
    }

    #[actix_web::test]
    async fn test_unsupported_file_reference_is_rejected_before_fetch() {
        let mut store = MockBlobStore::new();
        store.expect_fetch().never();
        let mut extractor = MockTextExtractor::new();
        extractor.expect_extract().never();
        let mut client = configured_client();
        client.expect_generate().never();

        let service = service(client, store, extractor, policy());
        let err = service
            .handle(RawInput::FileReference {
                url: "https://blob.example.com/a.zip".to_string(),
                mime_type: "application/zip".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("Invalid file type"));
    }

    #[test]
    fn test_backoff_delay_doubles_and_is_capped() {
        let base = Duration::from_secs(2);

        assert_eq!(backoff_delay(base, 0), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(16));
        assert_eq!(backoff_delay(base, 5), Duration::from_secs(60));
        assert_eq!(backoff_delay(base, 40), Duration::from_secs(60));
        assert_eq!(backoff_delay(Duration::ZERO, u32::MAX), Duration::ZERO);
    }

    #[actix_web::test]
    async fn test_many_retries_stop_without_overflow() {
        let mut client = configured_client();
        client
            .expect_generate()
            .times(41)
            .returning(|_, _| Err(GenerationError::Timeout));

        let mut policy = policy();
        policy.max_retries = 40;
        policy.retry_delay = Duration::ZERO;

        let service = service(client, MockBlobStore::new(), MockTextExtractor::new(), policy);
        let err = service
            .handle(RawInput::Text(photosynthesis_text()))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }
}
