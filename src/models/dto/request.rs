use serde::Deserialize;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::domain::RawInput,
};

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_TEXT: &str = "text/plain";

/// Document types the extractor can be asked about. Anything else is refused
/// before storage is touched.
pub const SUPPORTED_DOCUMENT_TYPES: [&str; 4] = [MIME_PDF, MIME_DOCX, MIME_DOC, MIME_TEXT];

/// Body of `POST /api/generate`. The four content keys are synonyms accepted
/// by the different upload flows of the frontend.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequestDto {
    pub notes: Option<String>,
    pub extracted_text: Option<String>,
    pub text: Option<String>,

    #[serde(rename = "fileURL", alias = "fileUrl")]
    #[validate(url(message = "fileURL must be a valid URL"))]
    pub file_url: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub mime_type: Option<String>,
}

impl GenerateRequestDto {
    pub fn into_raw_input(self) -> AppResult<RawInput> {
        self.validate()?;

        if let Some(url) = self.file_url.filter(|u| !u.trim().is_empty()) {
            let url = url.trim().to_string();
            ensure_http_url(&url)?;

            let mime_type = match self.mime_type {
                Some(mime) => normalize_mime(&mime),
                None => mime_from_path(&url).ok_or_else(|| {
                    AppError::input_with_help(
                        "Could not determine the file type of fileURL",
                        "Include a mimeType field alongside fileURL",
                    )
                })?,
            };

            return Ok(RawInput::FileReference { url, mime_type });
        }

        [self.notes, self.extracted_text, self.text]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
            .map(RawInput::Text)
            .ok_or_else(|| {
                AppError::input_with_help(
                    "No content provided",
                    "Send your study material in the notes, text, extractedText or fileURL field",
                )
            })
    }
}

/// Body of `POST /api/process-file`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFileRequestDto {
    #[validate(url(message = "blobUrl must be a valid URL"))]
    pub blob_url: String,

    #[validate(length(min = 1, max = 200, message = "mimeType is required"))]
    pub mime_type: String,
}

pub fn ensure_http_url(url: &str) -> AppResult<()> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| AppError::input(format!("Invalid file URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::input(format!(
            "Invalid file URL: unsupported scheme '{}'",
            other
        ))),
    }
}

pub fn ensure_supported_type(mime_type: &str) -> AppResult<()> {
    if SUPPORTED_DOCUMENT_TYPES.contains(&mime_type) {
        Ok(())
    } else {
        Err(unsupported_type(mime_type))
    }
}

pub fn unsupported_type(mime_type: &str) -> AppError {
    AppError::input_with_help(
        format!("Invalid file type: {}", mime_type),
        "Upload a PDF, Word (.docx/.doc) or plain text (.txt) file",
    )
}

/// Lower-cases a MIME type and drops parameters such as `; charset=utf-8`.
pub fn normalize_mime(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn mime_from_path(path: &str) -> Option<String> {
    let without_query = path.split(['?', '#']).next().unwrap_or_default();
    let extension = without_query.rsplit_once('.')?.1.to_ascii_lowercase();

    let mime = match extension.as_str() {
        "pdf" => MIME_PDF,
        "docx" => MIME_DOCX,
        "doc" => MIME_DOC,
        "txt" | "md" => MIME_TEXT,
        _ => return None,
    };
    Some(mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_become_text_input() {
        let dto: GenerateRequestDto =
            serde_json::from_str(r#"{"notes": "Cells are the unit of life."}"#).unwrap();
        assert_eq!(
            dto.into_raw_input().unwrap(),
            RawInput::Text("Cells are the unit of life.".to_string())
        );
    }

    #[test]
    fn test_synonyms_are_accepted() {
        for key in ["text", "extractedText"] {
            let body = format!(r#"{{"{}": "Mitochondria make ATP."}}"#, key);
            let dto: GenerateRequestDto = serde_json::from_str(&body).unwrap();
            assert!(matches!(dto.into_raw_input().unwrap(), RawInput::Text(_)));
        }
    }

    #[test]
    fn test_empty_notes_is_missing_content() {
        let dto: GenerateRequestDto = serde_json::from_str(r#"{"notes": ""}"#).unwrap();
        let err = dto.into_raw_input().unwrap_err();
        assert!(err.to_string().contains("No content"));
    }

    #[test]
    fn test_file_url_infers_mime_from_extension() {
        let dto: GenerateRequestDto =
            serde_json::from_str(r#"{"fileURL": "https://blob.example.com/a/lecture.PDF?x=1"}"#)
                .unwrap();
        assert_eq!(
            dto.into_raw_input().unwrap(),
            RawInput::FileReference {
                url: "https://blob.example.com/a/lecture.PDF?x=1".to_string(),
                mime_type: MIME_PDF.to_string(),
            }
        );
    }

    #[test]
    fn test_file_url_with_explicit_mime_keeps_it() {
        let dto: GenerateRequestDto = serde_json::from_str(
            r#"{"fileURL": "https://blob.example.com/upload", "mimeType": "Text/Plain; charset=utf-8"}"#,
        )
        .unwrap();
        assert!(matches!(
            dto.into_raw_input().unwrap(),
            RawInput::FileReference { mime_type, .. } if mime_type == MIME_TEXT
        ));
    }

    #[test]
    fn test_invalid_file_url_is_rejected() {
        let dto: GenerateRequestDto =
            serde_json::from_str(r#"{"fileURL": "not a url"}"#).unwrap();
        assert!(dto.into_raw_input().is_err());

        assert!(ensure_http_url("ftp://example.com/notes.txt").is_err());
        assert!(ensure_http_url("https://example.com/notes.txt").is_ok());
    }

    #[test]
    fn test_process_file_request_requires_mime() {
        let dto = ProcessFileRequestDto {
            blob_url: "https://blob.example.com/notes.txt".to_string(),
            mime_type: String::new(),
        };
        assert!(dto.validate().is_err());
    }
}
