//! Error types for snaptext.
//!
//! Every fallible operation in the crate returns [`SnaptextError`]. The variants map
//! directly onto how the web front end reports a failure:
//!
//! - `Validation` - user-correctable input problems (bad extension, too many files, ...)
//! - `Decode` - the uploaded bytes are not a readable image
//! - `Ocr` - the recognition engine failed for one image
//! - `NotFound` - a download was requested with no stored batch or a bad index
//! - everything else is an internal fault and is never shown to the user verbatim
//!
//! System errors (`Io`) bubble up unchanged via `?`.
//!
//! # Example
//!
//! ```rust
//! use snaptext::{Result, SnaptextError};
//!
//! fn check_name(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(SnaptextError::validation("Please select a file to upload."));
//!     }
//!     Ok(())
//! }
//! ```
use thiserror::Error;

/// Result type alias using `SnaptextError`.
pub type Result<T> = std::result::Result<T, SnaptextError>;

/// Main error type for all snaptext operations.
#[derive(Debug, Error)]
pub enum SnaptextError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Decode error: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Template error: {message}")]
    Template {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for SnaptextError {
    fn from(err: serde_json::Error) -> Self {
        SnaptextError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<minijinja::Error> for SnaptextError {
    fn from(err: minijinja::Error) -> Self {
        SnaptextError::Template {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<::image::ImageError> for SnaptextError {
    fn from(err: ::image::ImageError) -> Self {
        SnaptextError::Decode {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl SnaptextError {
    error_constructor!(validation, Validation);
    error_constructor!(decode, Decode);
    error_constructor!(ocr, Ocr);
    error_constructor!(template, Template);
    error_constructor!(serialization, Serialization);
    error_constructor!(config, Config);

    /// Create a NotFound error.
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    /// The bare message without the variant prefix added by `Display`.
    pub fn message(&self) -> String {
        match self {
            Self::Validation { message, .. }
            | Self::Decode { message, .. }
            | Self::Ocr { message, .. }
            | Self::Template { message, .. }
            | Self::Serialization { message, .. }
            | Self::Config { message, .. } => message.clone(),
            Self::NotFound(message) | Self::Other(message) => message.clone(),
            Self::Io(err) => err.to_string(),
        }
    }

    /// Whether the user can fix this by changing their upload.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Decode { .. })
    }
}
