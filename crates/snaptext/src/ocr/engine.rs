//! OCR engine capability trait.

use async_trait::async_trait;
use image::GrayImage;

use super::types::RecognitionSettings;
use crate::Result;

/// Anything that can turn a bitmap into text.
///
/// Implementations must be thread-safe (`Send + Sync`); one engine instance is shared by
/// every request. Each call is independent: no state carries over between images.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use image::GrayImage;
/// use snaptext::Result;
/// use snaptext::ocr::{OcrEngine, RecognitionSettings};
///
/// struct Echo;
///
/// #[async_trait]
/// impl OcrEngine for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     async fn recognize(&self, image: &GrayImage, _settings: &RecognitionSettings) -> Result<String> {
///         Ok(format!("{}x{}", image.width(), image.height()))
///     }
/// }
/// ```
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Recognize text in a preprocessed bitmap.
    ///
    /// # Errors
    ///
    /// - `SnaptextError::Ocr` - the engine failed or produced unreadable output
    /// - `SnaptextError::Io` - the engine could not be reached at all
    async fn recognize(&self, image: &GrayImage, settings: &RecognitionSettings) -> Result<String>;
}
