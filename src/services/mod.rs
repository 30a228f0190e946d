pub mod blob_store;
pub mod content_analyzer;
pub mod generation_client;
pub mod prompt_builder;
pub mod response_normalizer;
pub mod study_pack_service;
pub mod text_extractor;
pub mod upload_service;
