use std::sync::Arc;

use crate::{
    config::Config,
    services::{
        blob_store::{BlobStore, HttpBlobStore},
        generation_client::{GeminiClient, GenerationClient},
        study_pack_service::{ContentPolicy, StudyPackService},
        text_extractor::{DocumentTextExtractor, TextExtractor},
        upload_service::UploadService,
    },
};

const JSON_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub study_pack_service: Arc<StudyPackService>,
    pub upload_service: Arc<UploadService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let generation_client = Arc::new(GeminiClient::new(&config));
        let blob_store = Arc::new(HttpBlobStore::new(&config));
        let text_extractor = Arc::new(DocumentTextExtractor::new());

        Self::with_collaborators(config, generation_client, blob_store, text_extractor)
    }

    /// Wires the services around explicit collaborators, so tests can swap in fakes.
    pub fn with_collaborators(
        config: Config,
        generation_client: Arc<dyn GenerationClient>,
        blob_store: Arc<dyn BlobStore>,
        text_extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        let study_pack_service = Arc::new(StudyPackService::new(
            generation_client,
            Arc::clone(&blob_store),
            Arc::clone(&text_extractor),
            ContentPolicy::from(&config),
            config.gemini_model.clone(),
        ));

        let upload_service = Arc::new(UploadService::new(
            blob_store,
            text_extractor,
            config.max_upload_bytes,
        ));

        Self {
            study_pack_service,
            upload_service,
            config: Arc::new(config),
        }
    }

    /// Largest JSON body accepted: the maximum content length in worst-case
    /// UTF-8 plus room for the surrounding object.
    pub fn json_body_limit(&self) -> usize {
        self.config.max_content_length.saturating_mul(4) + JSON_OVERHEAD_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_app_state_reports_configured_services() {
        let state = AppState::new(Config::test_config());

        assert!(state.study_pack_service.is_generation_configured());
        assert!(state.upload_service.is_storage_configured());
        assert!(state.json_body_limit() > 200_000);
    }
}
