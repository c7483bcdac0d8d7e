//! Fixed preprocessing pipeline applied to every upload before recognition.
//!
//! grayscale → 3×3 median → threshold at 140. No configuration: the same bytes always
//! produce the same bitmap.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::median_filter;

use crate::{Result, SnaptextError};

/// Pixels strictly darker than this become black, everything else white.
pub const BINARIZE_THRESHOLD: u8 = 140;

/// Radius of the median filter window (1 => 3×3).
pub const MEDIAN_RADIUS: u32 = 1;

const BLACK: u8 = 0;
const WHITE: u8 = 255;

/// Decode raw upload bytes into an image.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|e| SnaptextError::decode_with_source(format!("Failed to decode image: {}", e), e))
}

/// Convert to 8-bit luma using the `image` crate's standard luminance weights.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Suppress isolated noise pixels.
pub fn denoise(image: &GrayImage) -> GrayImage {
    median_filter(image, MEDIAN_RADIUS, MEDIAN_RADIUS)
}

/// Two-level threshold: `< threshold` → 0, otherwise 255.
pub fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let Luma([value]) = *pixel;
        *pixel = Luma([if value < threshold { BLACK } else { WHITE }]);
    }
    out
}

/// Run the whole pipeline on an already decoded image.
pub fn preprocess(image: &DynamicImage) -> GrayImage {
    let gray = to_grayscale(image);
    let denoised = denoise(&gray);
    binarize(&denoised, BINARIZE_THRESHOLD)
}

/// Decode and preprocess raw upload bytes.
///
/// # Errors
///
/// Returns `SnaptextError::Decode` when the bytes are not a supported image.
pub fn preprocess_image(bytes: &[u8]) -> Result<GrayImage> {
    let decoded = decode_image(bytes)?;
    let processed = preprocess(&decoded);
    tracing::debug!(
        width = processed.width(),
        height = processed.height(),
        "Preprocessed image for recognition"
    );
    Ok(processed)
}

/// True if every pixel is pure black or pure white.
pub fn is_bilevel(image: &GrayImage) -> bool {
    image.pixels().all(|Luma([v])| *v == BLACK || *v == WHITE)
}
