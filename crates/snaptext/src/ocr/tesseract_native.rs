//! In-process Tesseract via `kreuzberg-tesseract`.
//!
//! A fresh `TesseractAPI` is created per image on the blocking pool; nothing is shared
//! between calls. The binding's `init` has no engine-mode parameter, so this engine always
//! runs OEM 3 and rejects any other `oem`.

use std::env;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::GrayImage;
use kreuzberg_tesseract::{TessPageSegMode, TesseractAPI};

use super::engine::OcrEngine;
use super::types::{OEMMode, RecognitionSettings};
use crate::{Result, SnaptextError};

const FALLBACK_TESSDATA_PATHS: [&str; 9] = [
    "/opt/homebrew/share/tessdata",
    "/opt/homebrew/opt/tesseract/share/tessdata",
    "/usr/local/opt/tesseract/share/tessdata",
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    r#"C:\Program Files\Tesseract-OCR\tessdata"#,
    r#"C:\ProgramData\Tesseract-OCR\tessdata"#,
];

#[derive(Debug, Clone, Default)]
pub struct NativeTesseractEngine {
    tessdata_dir: Option<PathBuf>,
}

impl NativeTesseractEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tessdata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tessdata_dir = Some(dir.into());
        self
    }

    /// Explicit directory, then `TESSDATA_PREFIX`, then the first common install path
    /// that exists.
    pub fn resolve_tessdata_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.tessdata_dir {
            return Some(dir.clone());
        }
        if let Ok(prefix) = env::var("TESSDATA_PREFIX") {
            return Some(PathBuf::from(prefix));
        }
        FALLBACK_TESSDATA_PATHS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .map(Path::to_path_buf)
    }

    pub fn version() -> String {
        TesseractAPI::version()
    }
}

fn recognize_blocking(image: &GrayImage, settings: &RecognitionSettings, tessdata: &str) -> Result<String> {
    // Missing traineddata makes the binding abort instead of erroring.
    if !tessdata.is_empty() {
        for lang in settings.language.split('+') {
            let traineddata = Path::new(tessdata).join(format!("{}.traineddata", lang));
            if !traineddata.exists() {
                return Err(SnaptextError::ocr(format!(
                    "Language '{}' not found. Traineddata file does not exist: {}",
                    lang,
                    traineddata.display()
                )));
            }
        }
    }

    let api = TesseractAPI::new();
    api.init(tessdata, &settings.language).map_err(|e| {
        SnaptextError::ocr(format!(
            "Failed to initialize language '{}': {}",
            settings.language, e
        ))
    })?;

    api.set_page_seg_mode(TessPageSegMode::from_int(settings.psm.as_u8() as i32))
        .map_err(|e| SnaptextError::ocr(format!("Failed to set PSM mode: {}", e)))?;

    let (width, height) = image.dimensions();
    api.set_image(image.as_raw(), width as i32, height as i32, 1, width as i32)
        .map_err(|e| SnaptextError::ocr(format!("Failed to set image: {}", e)))?;

    api.recognize()
        .map_err(|e| SnaptextError::ocr(format!("Failed to recognize text: {}", e)))?;

    api.get_utf8_text()
        .map_err(|e| SnaptextError::ocr(format!("Failed to extract text: {}", e)))
}

#[async_trait]
impl OcrEngine for NativeTesseractEngine {
    fn name(&self) -> &str {
        "tesseract-native"
    }

    async fn recognize(&self, image: &GrayImage, settings: &RecognitionSettings) -> Result<String> {
        settings.validate().map_err(SnaptextError::ocr)?;
        if settings.oem != OEMMode::Default {
            return Err(SnaptextError::ocr(format!(
                "OEM {} is not supported by the native engine, which always runs OEM 3",
                settings.oem.as_u8()
            )));
        }

        let tessdata = self
            .resolve_tessdata_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let image = image.clone();
        let settings = settings.clone();

        tokio::task::spawn_blocking(move || recognize_blocking(&image, &settings, &tessdata))
            .await
            .map_err(|e| SnaptextError::Other(format!("Tesseract task panicked: {}", e)))?
    }
}
