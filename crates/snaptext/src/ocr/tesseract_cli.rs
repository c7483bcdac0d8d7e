//! Tesseract driven as a subprocess.
//!
//! The bitmap is encoded as PNG and piped to `tesseract stdin stdout`, so nothing touches
//! the filesystem.

use std::io::Cursor;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

use super::engine::OcrEngine;
use super::types::RecognitionSettings;
use crate::{Result, SnaptextError};

/// Default timeout for a single recognition (120 seconds)
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

#[derive(Debug, Clone)]
pub struct TesseractCliEngine {
    executable: PathBuf,
    tessdata_dir: Option<PathBuf>,
    timeout: Duration,
}

impl Default for TesseractCliEngine {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("tesseract"),
            tessdata_dir: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl TesseractCliEngine {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            ..Default::default()
        }
    }

    pub fn with_tessdata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tessdata_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn executable(&self) -> &PathBuf {
        &self.executable
    }

    /// Command-line arguments for one invocation, excluding the executable.
    pub fn build_args(&self, settings: &RecognitionSettings) -> Vec<String> {
        let mut args = vec!["stdin".to_string(), "stdout".to_string()];
        if let Some(dir) = &self.tessdata_dir {
            args.push("--tessdata-dir".to_string());
            args.push(dir.display().to_string());
        }
        args.extend([
            "-l".to_string(),
            settings.language.clone(),
            "--oem".to_string(),
            settings.oem.as_u8().to_string(),
            "--psm".to_string(),
            settings.psm.as_u8().to_string(),
        ]);
        args
    }
}

fn encode_png(image: &GrayImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image.clone())
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| SnaptextError::ocr_with_source(format!("Failed to encode bitmap for tesseract: {}", e), e))?;
    Ok(buf.into_inner())
}

#[async_trait]
impl OcrEngine for TesseractCliEngine {
    fn name(&self) -> &str {
        "tesseract-cli"
    }

    async fn recognize(&self, image: &GrayImage, settings: &RecognitionSettings) -> Result<String> {
        settings.validate().map_err(SnaptextError::ocr)?;

        let png = encode_png(image)?;
        let args = self.build_args(settings);

        tracing::debug!(
            executable = %self.executable.display(),
            args = ?args,
            bytes = png.len(),
            "Invoking tesseract"
        );

        let mut child = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SnaptextError::ocr_with_source(
                    format!("Failed to execute {}: {}", self.executable.display(), e),
                    e,
                )
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SnaptextError::ocr("Failed to open tesseract stdin"))?;
        let writer = tokio::spawn(async move {
            stdin.write_all(&png).await?;
            stdin.shutdown().await
        });

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(SnaptextError::ocr_with_source(format!("Failed to wait for tesseract: {}", e), e)),
            Err(_) => {
                return Err(SnaptextError::ocr(format!(
                    "Tesseract timed out after {} seconds",
                    self.timeout.as_secs()
                )));
            }
        };

        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!("Tesseract closed stdin early: {}", e),
            Err(e) => return Err(SnaptextError::Other(format!("Tesseract stdin task panicked: {}", e))),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SnaptextError::ocr(format!(
                "Tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| SnaptextError::ocr_with_source(format!("Tesseract produced invalid UTF-8: {}", e), e))
    }
}
