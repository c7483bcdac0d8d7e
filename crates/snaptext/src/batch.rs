//! Batch orchestration.
//!
//! Uploads are processed strictly in submission order, one at a time. Validation is
//! interleaved with recognition: files before an invalid one have already been
//! recognized when the batch is rejected.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::ServiceConfig;
use crate::image::preprocess_image;
use crate::ocr::{OcrEngine, Recognizer};
use crate::session::{SessionId, SessionStore};
use crate::types::{BatchOutcome, ExtractionResult, UploadItem};
use crate::validation::{ValidationLimits, ValidationOutcome, validate_batch_size, validate_file};
use crate::{Result, SnaptextError};

/// Shown in place of the decoder's message when an upload is not a readable image.
pub const DECODE_FAILURE_MESSAGE: &str = "Failed to process the image. Please ensure it's a valid image file.";

pub const NO_FILES_MESSAGE: &str = "Please select at least one file to upload.";

pub const NO_TEXT_MESSAGE: &str = "No text extracted from any image.";

/// What to do when one file in a batch fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Reject the whole submission and discard anything already recognized.
    #[default]
    AbortBatch,
    /// Record an error entry for the file and keep going.
    SkipInvalid,
}

pub struct BatchOrchestrator {
    recognizer: Recognizer,
    store: Arc<dyn SessionStore>,
    limits: ValidationLimits,
    policy: ValidationPolicy,
}

impl BatchOrchestrator {
    pub fn new(recognizer: Recognizer, store: Arc<dyn SessionStore>, limits: ValidationLimits) -> Self {
        Self {
            recognizer,
            store,
            limits,
            policy: ValidationPolicy::default(),
        }
    }

    /// Wire `engine` and `store` together using the limits, policy and recognition
    /// settings from `config`.
    pub fn from_config(
        config: &ServiceConfig,
        engine: Arc<dyn OcrEngine>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let recognizer = Recognizer::new(engine, config.ocr.recognition_settings()?);
        Ok(Self::new(recognizer, store, config.limits.clone()).with_policy(config.validation_policy))
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Run the batch and, if it succeeded, make it the session's current batch.
    pub async fn process(&self, session: &SessionId, items: Vec<UploadItem>) -> BatchOutcome {
        let outcome = self.run(items).await;

        if outcome.is_success() {
            tracing::info!(session = %session, files = outcome.results.len(), "Stored batch results");
            self.store.put(session, outcome.results.clone());
        }

        outcome
    }

    /// Run the batch without touching the session store.
    pub async fn run(&self, items: Vec<UploadItem>) -> BatchOutcome {
        if let ValidationOutcome::Rejected(reason) = validate_batch_size(items.len(), &self.limits) {
            tracing::info!("Batch rejected: {}", reason);
            return BatchOutcome::rejected(reason.to_string());
        }

        let mut results = Vec::with_capacity(items.len());
        let mut submitted = 0usize;

        for item in items {
            if item.is_blank_slot() {
                continue;
            }
            submitted += 1;

            if let ValidationOutcome::Rejected(reason) = validate_file(&item.filename, item.size_bytes, &self.limits) {
                match self.policy {
                    ValidationPolicy::AbortBatch => {
                        tracing::info!(file = %item.filename, "Batch rejected: {}", reason);
                        return BatchOutcome::rejected(reason.to_string());
                    }
                    ValidationPolicy::SkipInvalid => {
                        tracing::info!(file = %item.filename, "Skipping invalid file: {}", reason);
                        results.push(ExtractionResult::error(item.filename, item.size_bytes, reason.to_string()));
                        continue;
                    }
                }
            }

            results.push(self.extract_one(item).await);
        }

        let error = if submitted == 0 {
            Some(NO_FILES_MESSAGE.to_string())
        } else if !results.iter().any(ExtractionResult::is_ok) {
            Some(NO_TEXT_MESSAGE.to_string())
        } else {
            None
        };

        BatchOutcome { results, error }
    }

    async fn extract_one(&self, item: UploadItem) -> ExtractionResult {
        let UploadItem {
            filename,
            data,
            size_bytes,
        } = item;

        let bitmap = match tokio::task::spawn_blocking(move || preprocess_image(&data)).await {
            Ok(Ok(bitmap)) => bitmap,
            Ok(Err(e)) => {
                tracing::error!(file = %filename, "Error processing upload: {}", e);
                return ExtractionResult::error(filename, size_bytes, DECODE_FAILURE_MESSAGE);
            }
            Err(e) => {
                tracing::error!(file = %filename, "Preprocessing task panicked: {}", e);
                return ExtractionResult::error(filename, size_bytes, DECODE_FAILURE_MESSAGE);
            }
        };

        match self.recognizer.recognize(&bitmap).await {
            Ok(text) => ExtractionResult::from_text(filename, size_bytes, &text),
            Err(e) => {
                let cause = match &e {
                    SnaptextError::Ocr { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                ExtractionResult::error(filename, size_bytes, cause)
            }
        }
    }
}
