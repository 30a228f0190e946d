use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub url: String,
    pub pathname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobStoreError {
    #[error("blob storage is not configured")]
    NotConfigured,
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("storage request timed out")]
    Timeout,
    #[error("remote file exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredBlob, BlobStoreError>;

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, BlobStoreError>;
}

#[derive(Deserialize, Debug)]
struct PutBlobResponse {
    url: String,
    #[serde(default)]
    pathname: Option<String>,
}

/// Blob storage reached over HTTP: `PUT {base}/{pathname}` with a bearer token,
/// answering with the public URL of the stored object.
pub struct HttpBlobStore {
    http: reqwest::Client,
    base_url: Option<String>,
    token: Option<SecretString>,
    max_fetch_bytes: usize,
}

impl HttpBlobStore {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config
                .blob_store_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_string()),
            token: config.blob_read_write_token.clone(),
            max_fetch_bytes: config.max_upload_bytes,
        }
    }
}

/// Keeps letters, digits, dots, dashes and underscores so the name is URL safe.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(['.', '_']).is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

fn map_transport(err: reqwest::Error, wrap: fn(String) -> BlobStoreError) -> BlobStoreError {
    if err.is_timeout() {
        BlobStoreError::Timeout
    } else {
        wrap(err.to_string())
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.token.is_some()
    }

    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredBlob, BlobStoreError> {
        let (Some(base_url), Some(token)) = (&self.base_url, &self.token) else {
            return Err(BlobStoreError::NotConfigured);
        };

        let pathname = format!("{}-{}", Uuid::new_v4(), sanitize_filename(filename));
        let size = data.len();

        let response = self
            .http
            .put(format!("{}/{}", base_url, pathname))
            .bearer_auth(token.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .timeout(UPLOAD_TIMEOUT)
            .body(data)
            .send()
            .await
            .map_err(|e| map_transport(e, BlobStoreError::UploadFailed))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BlobStoreError::UploadFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }

        let stored: PutBlobResponse = response
            .json()
            .await
            .map_err(|e| BlobStoreError::UploadFailed(format!("unexpected storage reply: {}", e)))?;

        log::info!("Stored {} bytes as {}", size, pathname);

        Ok(StoredBlob {
            url: stored.url,
            pathname: stored.pathname.unwrap_or(pathname),
        })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, BlobStoreError> {
        let mut response = self
            .http
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| map_transport(e, BlobStoreError::DownloadFailed))?;

        match response.status() {
            s if s.is_success() => {}
            reqwest::StatusCode::NOT_FOUND => return Err(BlobStoreError::NotFound(url.to_string())),
            s => {
                return Err(BlobStoreError::DownloadFailed(format!(
                    "HTTP {}",
                    s.as_u16()
                )))
            }
        }

        let limit = self.max_fetch_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(BlobStoreError::TooLarge { limit });
        }

        // The declared length may be missing or wrong; count what actually arrives.
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| map_transport(e, BlobStoreError::DownloadFailed))?
        {
            if bytes.len() + chunk.len() > limit {
                return Err(BlobStoreError::TooLarge { limit });
            }
            bytes.extend_from_slice(&chunk);
        }

        log::info!("Fetched {} bytes from storage", bytes.len());
        Ok(bytes)
    }
}
