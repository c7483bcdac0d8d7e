//! Upload validation.
//!
//! Pure predicates over upload metadata: no decoding, no I/O. The batch-level count check
//! runs before any per-file check; per-file checks run in a fixed order and the first
//! failure wins.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default allow-list of image extensions (lowercase, without the dot).
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Default per-file ceiling: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Default per-batch file count ceiling.
pub const DEFAULT_MAX_FILES: usize = 10;

/// Limits applied by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationLimits {
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_max_file_size_bytes() -> u64 {
    DEFAULT_MAX_FILE_SIZE_BYTES
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

fn default_allowed_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size_bytes(),
            max_files: default_max_files(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl ValidationLimits {
    /// Human-readable size ceiling, e.g. `10MB`.
    pub fn max_file_size_label(&self) -> String {
        let mb = self.max_file_size_bytes / (1024 * 1024);
        if mb > 0 && self.max_file_size_bytes % (1024 * 1024) == 0 {
            format!("{mb}MB")
        } else {
            format!("{} bytes", self.max_file_size_bytes)
        }
    }

    pub fn allowed_extensions_label(&self) -> String {
        self.allowed_extensions.join(", ")
    }
}

/// Why an upload (or a whole batch) was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingFilename,
    DisallowedExtension { filename: String, allowed: String },
    FileTooLarge { filename: String, limit: String },
    TooManyFiles { count: usize, max: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFilename => write!(f, "Please select a file to upload."),
            Self::DisallowedExtension { filename, allowed } => {
                write!(f, "Invalid file type for '{}'. Please upload: {}", filename, allowed)
            }
            Self::FileTooLarge { filename, limit } => {
                write!(f, "File '{}' exceeds the {} size limit.", filename, limit)
            }
            Self::TooManyFiles { max, .. } => {
                write!(f, "Too many files. Please upload at most {} images at a time.", max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating one file or a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected(ValidationError),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            Self::Accepted => Ok(()),
            Self::Rejected(reason) => Err(reason),
        }
    }
}

/// Lowercased extension after the last `.`, if there is a `.` at all.
pub fn file_extension(filename: &str) -> Option<String> {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

/// Extension allow-list check. A filename with no `.` is never allowed.
pub fn allowed_file(filename: &str, limits: &ValidationLimits) -> bool {
    match file_extension(filename) {
        Some(ext) => limits.allowed_extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext)),
        None => false,
    }
}

/// Check one candidate file: presence, extension, then size.
pub fn validate_file(filename: &str, size_bytes: u64, limits: &ValidationLimits) -> ValidationOutcome {
    if filename.is_empty() {
        return ValidationOutcome::Rejected(ValidationError::MissingFilename);
    }

    if !allowed_file(filename, limits) {
        return ValidationOutcome::Rejected(ValidationError::DisallowedExtension {
            filename: filename.to_string(),
            allowed: limits.allowed_extensions_label(),
        });
    }

    if size_bytes > limits.max_file_size_bytes {
        return ValidationOutcome::Rejected(ValidationError::FileTooLarge {
            filename: filename.to_string(),
            limit: limits.max_file_size_label(),
        });
    }

    ValidationOutcome::Accepted
}

/// Batch-level count check.
pub fn validate_batch_size(count: usize, limits: &ValidationLimits) -> ValidationOutcome {
    if count > limits.max_files {
        ValidationOutcome::Rejected(ValidationError::TooManyFiles {
            count,
            max: limits.max_files,
        })
    } else {
        ValidationOutcome::Accepted
    }
}
