//! snaptext - image-to-text extraction behind a small web front end.
//!
//! Users upload one or more images; each is validated, cleaned up into a black-and-white
//! bitmap and passed to an OCR engine. Results are shown on the page and kept per browser
//! session so they can be downloaded as plain text.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use snaptext::{ServiceConfig, api::serve_with_config};
//!
//! #[tokio::main]
//! async fn main() -> snaptext::Result<()> {
//!     let config = ServiceConfig::load(None)?;
//!     serve_with_config(config).await
//! }
//! ```
//!
//! # Architecture
//!
//! - **Validation** (`validation`): extension allow-list, per-file and per-batch ceilings
//! - **Preprocessing** (`image`): grayscale, median denoise, fixed-threshold binarization
//! - **OCR** (`ocr`): the `OcrEngine` trait, Tesseract engines and the `Recognizer` adapter
//! - **Batches** (`batch`): in-order processing with the abort/skip validation policy
//! - **Sessions** (`session`): one stored batch per session id
//! - **Downloads** (`download`): plain-text documents for one or all results
//! - **Presentation** (`render`) and **HTTP** (`api`)

#![deny(unsafe_code)]

pub mod batch;
pub mod core;
pub mod download;
pub mod error;
pub mod image;
pub mod ocr;
pub mod render;
pub mod session;
pub mod types;
pub mod validation;

#[cfg(feature = "api")]
pub mod api;

pub use error::{Result, SnaptextError};
pub use types::*;

pub use batch::{BatchOrchestrator, ValidationPolicy};
pub use core::config::{OcrConfig, OcrEngineKind, ServiceConfig};
pub use ocr::{OcrEngine, Recognizer, RecognitionSettings};
pub use session::{MemorySessionStore, SessionId, SessionStore};
pub use validation::{ValidationError, ValidationLimits, ValidationOutcome};
