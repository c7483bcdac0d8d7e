//! Core data types shared by the pipeline, the session store and the web layer.

use serde::{Deserialize, Serialize};

/// Placeholder stored when recognition succeeds but yields no text.
pub const EMPTY_TEXT_PLACEHOLDER: &str = "No text could be extracted from this image.";

/// Prefix of the placeholder stored when a single file fails to process.
pub const ERROR_TEXT_PREFIX: &str = "Error processing image: ";

/// One uploaded file, as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    /// Filename declared by the client. Empty for an unused form slot.
    pub filename: String,
    /// Raw bytes of the upload.
    pub data: Vec<u8>,
    /// Measured length of `data` in bytes.
    pub size_bytes: u64,
}

impl UploadItem {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let size_bytes = data.len() as u64;
        Self {
            filename: filename.into(),
            data,
            size_bytes,
        }
    }

    /// An unused multipart slot (the browser sends an empty filename).
    pub fn is_blank_slot(&self) -> bool {
        self.filename.is_empty()
    }
}

/// Outcome tag for a single extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionStatus {
    Ok,
    Empty,
    Error { message: String },
}

/// Text extracted from one accepted upload.
///
/// `text` always holds something displayable: real OCR output for [`ExtractionStatus::Ok`],
/// a placeholder otherwise. Use [`ExtractionResult::is_placeholder`] to tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub filename: String,
    pub text: String,
    pub size_bytes: u64,
    pub status: ExtractionStatus,
}

impl ExtractionResult {
    /// Build a result from raw recognizer output. Whitespace is trimmed and an empty
    /// string becomes the empty-text placeholder.
    pub fn from_text(filename: impl Into<String>, size_bytes: u64, text: &str) -> Self {
        let trimmed = text.trim();
        let (text, status) = if trimmed.is_empty() {
            (EMPTY_TEXT_PLACEHOLDER.to_string(), ExtractionStatus::Empty)
        } else {
            (trimmed.to_string(), ExtractionStatus::Ok)
        };
        Self {
            filename: filename.into(),
            text,
            size_bytes,
            status,
        }
    }

    pub fn error(filename: impl Into<String>, size_bytes: u64, cause: impl Into<String>) -> Self {
        let message = cause.into();
        Self {
            filename: filename.into(),
            text: format!("{ERROR_TEXT_PREFIX}{message}"),
            size_bytes,
            status: ExtractionStatus::Error { message },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ExtractionStatus::Ok
    }

    /// True when `text` is a placeholder rather than recognized text.
    pub fn is_placeholder(&self) -> bool {
        !self.is_ok()
    }

    /// Number of characters in `text` (not bytes).
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Results of one upload request, in submission order.
pub type BatchResult = Vec<ExtractionResult>;

/// What the orchestrator hands back to the web layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub results: BatchResult,
    /// Batch-level error shown as a banner.
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
