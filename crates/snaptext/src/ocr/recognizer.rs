//! Recognizer adapter: the one place the pipeline talks to an OCR engine.

use std::sync::Arc;

use image::GrayImage;

use super::engine::OcrEngine;
use super::types::RecognitionSettings;
use crate::{Result, SnaptextError};

/// Fixed-configuration wrapper around an [`OcrEngine`].
///
/// Output is trimmed; every failure is logged and surfaced as `SnaptextError::Ocr`
/// carrying the engine's message. There are no retries.
#[derive(Clone)]
pub struct Recognizer {
    engine: Arc<dyn OcrEngine>,
    settings: RecognitionSettings,
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recognizer")
            .field("engine", &self.engine.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Recognizer {
    pub fn new(engine: Arc<dyn OcrEngine>, settings: RecognitionSettings) -> Self {
        Self { engine, settings }
    }

    /// English, OEM 3, PSM 6.
    pub fn with_default_settings(engine: Arc<dyn OcrEngine>) -> Self {
        Self::new(engine, RecognitionSettings::default())
    }

    pub fn settings(&self) -> &RecognitionSettings {
        &self.settings
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub async fn recognize(&self, bitmap: &GrayImage) -> Result<String> {
        match self.engine.recognize(bitmap, &self.settings).await {
            Ok(text) => {
                let text = text.trim().to_string();
                tracing::info!(
                    "Successfully extracted text from image: {} characters",
                    text.chars().count()
                );
                Ok(text)
            }
            Err(e) => {
                let message = e.message();
                tracing::error!(engine = self.engine.name(), "OCR processing failed: {}", message);
                Err(SnaptextError::ocr_with_source(message, e))
            }
        }
    }
}
