use std::io::{Cursor, Read};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::dto::request::{MIME_DOC, MIME_DOCX, MIME_PDF, MIME_TEXT};

const DOCX_BODY_PART: &str = "word/document.xml";

static DOCX_PARAGRAPH_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</w:p>|<w:br\s*/>|<w:cr\s*/>").expect("DOCX_PARAGRAPH_END is a valid regex pattern")
});
static DOCX_TAB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:tab\s*/>").expect("DOCX_TAB is a valid regex pattern"));
static XML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("XML_TAG is a valid regex pattern"));
static XML_CHAR_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));")
        .expect("XML_CHAR_REF is a valid regex pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("legacy .doc files are not supported")]
    LegacyWordUnsupported,
    #[error("no extractable text found")]
    EmptyContent,
    #[error("document is password protected")]
    PasswordProtected,
    #[error("document could not be read: {0}")]
    Corrupted(String),
}

impl ExtractionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ExtractionError::UnsupportedType(_) => "This file type is not supported",
            ExtractionError::LegacyWordUnsupported => "Legacy Word (.doc) files are not supported",
            ExtractionError::EmptyContent => "No text could be extracted from this file",
            ExtractionError::PasswordProtected => "This document is password protected",
            ExtractionError::Corrupted(_) => "This file appears to be corrupted or unreadable",
        }
    }

    pub fn user_help(&self) -> &'static str {
        match self {
            ExtractionError::UnsupportedType(_) => "Upload a PDF, Word (.docx) or plain text file",
            ExtractionError::LegacyWordUnsupported => {
                "Save the document as .docx or PDF and upload it again, or paste the text directly"
            }
            ExtractionError::EmptyContent => {
                "Scanned or image-based PDFs have no text layer; paste the text directly instead"
            }
            ExtractionError::PasswordProtected => "Remove the password and upload the file again",
            ExtractionError::Corrupted(_) => {
                "Re-save or re-export the file and try again, or paste the text directly"
            }
        }
    }
}

/// Turns a document buffer into plain text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, data: Vec<u8>, mime_type: &str) -> Result<String, ExtractionError>;
}

/// Extracts plain text, PDF and DOCX content.
#[derive(Default)]
pub struct DocumentTextExtractor;

impl DocumentTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for DocumentTextExtractor {
    async fn extract(&self, data: Vec<u8>, mime_type: &str) -> Result<String, ExtractionError> {
        log::info!("Extracting text from {} bytes of {}", data.len(), mime_type);

        let text = match mime_type {
            MIME_TEXT => String::from_utf8_lossy(&data).into_owned(),
            MIME_PDF => tokio::task::spawn_blocking(move || extract_pdf(&data))
                .await
                .map_err(|e| ExtractionError::Corrupted(format!("extraction task failed: {}", e)))??,
            MIME_DOCX => tokio::task::spawn_blocking(move || extract_docx(&data))
                .await
                .map_err(|e| ExtractionError::Corrupted(format!("extraction task failed: {}", e)))??,
            MIME_DOC => return Err(ExtractionError::LegacyWordUnsupported),
            other => return Err(ExtractionError::UnsupportedType(other.to_string())),
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractionError::EmptyContent);
        }
        Ok(text.to_string())
    }
}

fn extract_pdf(data: &[u8]) -> Result<String, ExtractionError> {
    if data.len() < 5 || &data[0..5] != b"%PDF-" {
        return Err(ExtractionError::Corrupted("missing PDF header".to_string()));
    }

    pdf_extract::extract_text_from_mem(data).map_err(|e| {
        let message = e.to_string();
        let lowered = message.to_lowercase();
        if lowered.contains("encrypt") || lowered.contains("password") {
            ExtractionError::PasswordProtected
        } else {
            ExtractionError::Corrupted(message)
        }
    })
}

fn extract_docx(data: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| ExtractionError::Corrupted(format!("not a DOCX archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY_PART)
        .map_err(|e| ExtractionError::Corrupted(format!("{} missing: {}", DOCX_BODY_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Corrupted(e.to_string()))?;

    Ok(docx_xml_to_text(&xml))
}

fn docx_xml_to_text(xml: &str) -> String {
    let with_breaks = DOCX_PARAGRAPH_END.replace_all(xml, "\n");
    let with_tabs = DOCX_TAB.replace_all(&with_breaks, "\t");
    let stripped = XML_TAG.replace_all(&with_tabs, "");
    decode_xml_entities(&stripped)
}

fn decode_xml_entities(text: &str) -> String {
    let text = XML_CHAR_REF.replace_all(text, |caps: &regex::Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(dec)) => dec.as_str().parse().ok(),
            (None, None) => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
