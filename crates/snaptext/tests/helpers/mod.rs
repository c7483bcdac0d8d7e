//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};

use snaptext::ocr::{OcrEngine, RecognitionSettings};
use snaptext::{Result, SnaptextError};

/// Engine that replays queued responses in order, then falls back to a default text.
pub struct ScriptedEngine {
    responses: Mutex<VecDeque<std::result::Result<String, String>>>,
    fallback: String,
    calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new(fallback: &str) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: fallback.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn then_text(self, text: &str) -> Self {
        self.responses.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn then_failure(self, message: &str) -> Self {
        self.responses.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn recognize(&self, _image: &GrayImage, _settings: &RecognitionSettings) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(SnaptextError::ocr(message)),
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Engine that panics with `message` on every call.
pub struct PanickingEngine {
    pub message: &'static str,
}

#[async_trait]
impl OcrEngine for PanickingEngine {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn recognize(&self, _image: &GrayImage, _settings: &RecognitionSettings) -> Result<String> {
        panic!("{}", self.message);
    }
}

/// A small RGB image encoded as PNG.
pub fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_fn(16, 16, |x, y| if (x + y) % 2 == 0 { Rgb([250, 250, 250]) } else { Rgb([20, 20, 20]) });
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

pub fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Checkerboard of solid black and white `block`-sized squares.
pub fn blocky_image(width: u32, height: u32, block: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        if ((x / block) + (y / block)) % 2 == 0 {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

pub const BOUNDARY: &str = "----snaptext-test-boundary";

/// Multipart body with one part per `(field, filename, bytes)`.
pub fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n").as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
