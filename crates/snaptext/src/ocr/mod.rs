//! OCR (Optical Character Recognition) subsystem.
//!
//! The pipeline depends only on the [`OcrEngine`] trait; [`Recognizer`] wraps an engine
//! with the fixed invocation parameters (English, OEM 3, PSM 6) and normalises its output.
//!
//! # Engines
//!
//! - [`TesseractCliEngine`] - drives the `tesseract` executable (default)
//! - `NativeTesseractEngine` - in-process binding, requires the `native-tesseract` feature
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use snaptext::ocr::{Recognizer, TesseractCliEngine};
//!
//! # async fn example() -> snaptext::Result<()> {
//! let recognizer = Recognizer::with_default_settings(Arc::new(TesseractCliEngine::default()));
//! let bytes = std::fs::read("scan.png")?;
//! let bitmap = snaptext::image::preprocess_image(&bytes)?;
//! println!("{}", recognizer.recognize(&bitmap).await?);
//! # Ok(())
//! # }
//! ```
pub mod engine;
pub mod recognizer;
pub mod tesseract_cli;
#[cfg(feature = "native-tesseract")]
pub mod tesseract_native;
pub mod types;

pub use engine::OcrEngine;
pub use recognizer::Recognizer;
pub use tesseract_cli::TesseractCliEngine;
#[cfg(feature = "native-tesseract")]
pub use tesseract_native::NativeTesseractEngine;
pub use types::{OEMMode, PSMMode, RecognitionSettings};
