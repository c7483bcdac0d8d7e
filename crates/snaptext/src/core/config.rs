//! Service configuration.
//!
//! Loaded from `snaptext.toml` (explicit path or discovered in the current and parent
//! directories), then overridden by environment variables:
//!
//! - `SNAPTEXT_HOST`, `SNAPTEXT_PORT`
//! - `SNAPTEXT_SECRET_KEY` - key material for signing session cookies
//! - `SNAPTEXT_MAX_REQUEST_BODY_BYTES`
//! - `SNAPTEXT_TESSERACT_PATH`
//! - `TESSDATA_PREFIX`

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::batch::ValidationPolicy;
use crate::ocr::{OEMMode, OcrEngine, PSMMode, RecognitionSettings, TesseractCliEngine};
use crate::validation::ValidationLimits;
use crate::{Result, SnaptextError};

/// Name of the discovered configuration file.
pub const CONFIG_FILE_NAME: &str = "snaptext.toml";

/// Fallback cookie-signing secret. Anyone who knows it can forge session cookies.
pub const DEV_SECRET_KEY: &str = "snaptext-development-secret-do-not-use-in-production";

/// Which OCR engine implementation to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngineKind {
    #[default]
    TesseractCli,
    TesseractNative,
}

/// OCR engine selection and invocation parameters.
///
/// The supported recognition contract is English (`eng`), OEM 3 and PSM 6, which are the
/// defaults. Other values are accepted for local tuning but are not part of that contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default)]
    pub engine: OcrEngineKind,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_psm")]
    pub psm: u8,
    #[serde(default = "default_oem")]
    pub oem: u8,
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: PathBuf,
    #[serde(default)]
    pub tessdata_dir: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::default(),
            language: default_language(),
            psm: default_psm(),
            oem: default_oem(),
            tesseract_path: default_tesseract_path(),
            tessdata_dir: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OcrConfig {
    pub fn recognition_settings(&self) -> Result<RecognitionSettings> {
        let settings = RecognitionSettings {
            language: self.language.clone(),
            psm: PSMMode::from_u8(self.psm).map_err(SnaptextError::config)?,
            oem: OEMMode::from_u8(self.oem).map_err(SnaptextError::config)?,
        };
        settings.validate().map_err(SnaptextError::config)?;
        if self.engine == OcrEngineKind::TesseractNative && settings.oem != OEMMode::Default {
            return Err(SnaptextError::config(format!(
                "ocr.oem = {} is not supported by the tesseract_native engine, which always runs OEM 3",
                self.oem
            )));
        }
        Ok(settings)
    }

    /// Construct the configured engine.
    ///
    /// # Errors
    ///
    /// `SnaptextError::Config` if the native engine is requested but the crate was built
    /// without the `native-tesseract` feature.
    pub fn build_engine(&self) -> Result<Arc<dyn OcrEngine>> {
        match self.engine {
            OcrEngineKind::TesseractCli => {
                let mut engine = TesseractCliEngine::new(&self.tesseract_path)
                    .with_timeout(Duration::from_secs(self.timeout_secs));
                if let Some(dir) = &self.tessdata_dir {
                    engine = engine.with_tessdata_dir(dir);
                }
                Ok(Arc::new(engine))
            }
            #[cfg(feature = "native-tesseract")]
            OcrEngineKind::TesseractNative => {
                let mut engine = crate::ocr::NativeTesseractEngine::new();
                if let Some(dir) = &self.tessdata_dir {
                    engine = engine.with_tessdata_dir(dir);
                }
                Ok(Arc::new(engine))
            }
            #[cfg(not(feature = "native-tesseract"))]
            OcrEngineKind::TesseractNative => Err(SnaptextError::config(
                "The tesseract_native engine requires building with the `native-tesseract` feature",
            )),
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Global request body ceiling; larger requests get the 413 page.
    #[serde(default = "default_max_request_body_bytes")]
    pub max_request_body_bytes: usize,
    #[serde(default)]
    pub limits: ValidationLimits,
    #[serde(default)]
    pub validation_policy: ValidationPolicy,
    #[serde(default)]
    pub ocr: OcrConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_request_body_bytes() -> usize {
    101 * 1024 * 1024
}
fn default_language() -> String {
    "eng".to_string()
}
fn default_psm() -> u8 {
    6
}
fn default_oem() -> u8 {
    3
}
fn default_tesseract_path() -> PathBuf {
    PathBuf::from("tesseract")
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            secret_key: None,
            max_request_body_bytes: default_max_request_body_bytes(),
            limits: ValidationLimits::default(),
            validation_policy: ValidationPolicy::default(),
            ocr: OcrConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `SnaptextError::Config` if the file can't be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SnaptextError::config(format!("Failed to read config file {}: {}", path.as_ref().display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| SnaptextError::config(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Search for `snaptext.toml` in the current directory and its parents.
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(SnaptextError::Io)?;

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    /// Explicit file if given, otherwise discovery, otherwise defaults; then environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading config from {}", path.display());
                Self::from_toml_file(path)?
            }
            None => match Self::discover()? {
                Some(config) => {
                    tracing::info!("Loaded config from discovered {}", CONFIG_FILE_NAME);
                    config
                }
                None => {
                    tracing::info!("No config file found, using default configuration");
                    Self::default()
                }
            },
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Unparsable numbers are ignored with
    /// a warning.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SNAPTEXT_HOST").filter(|v| !v.trim().is_empty()) {
            self.host = host;
        }

        if let Some(value) = lookup("SNAPTEXT_PORT") {
            match value.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!("Failed to parse SNAPTEXT_PORT='{}', must be a valid port", value),
            }
        }

        if let Some(secret) = lookup("SNAPTEXT_SECRET_KEY").filter(|v| !v.is_empty()) {
            self.secret_key = Some(secret);
        }

        if let Some(value) = lookup("SNAPTEXT_MAX_REQUEST_BODY_BYTES") {
            match value.parse::<usize>() {
                Ok(bytes) if bytes > 0 => self.max_request_body_bytes = bytes,
                _ => tracing::warn!(
                    "Failed to parse SNAPTEXT_MAX_REQUEST_BODY_BYTES='{}', must be a positive integer",
                    value
                ),
            }
        }

        if let Some(path) = lookup("SNAPTEXT_TESSERACT_PATH").filter(|v| !v.is_empty()) {
            self.ocr.tesseract_path = PathBuf::from(path);
        }

        if self.ocr.tessdata_dir.is_none()
            && let Some(dir) = lookup("TESSDATA_PREFIX").filter(|v| !v.is_empty())
        {
            self.ocr.tessdata_dir = Some(PathBuf::from(dir));
        }
    }

    /// The configured secret, or the development fallback.
    pub fn secret_key_or_default(&self) -> &str {
        self.secret_key.as_deref().unwrap_or(DEV_SECRET_KEY)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.limits.max_files == 0 {
            return Err(SnaptextError::config("limits.max_files must be at least 1"));
        }
        if self.limits.allowed_extensions.is_empty() {
            return Err(SnaptextError::config("limits.allowed_extensions must not be empty"));
        }
        if self.max_request_body_bytes == 0 {
            return Err(SnaptextError::config("max_request_body_bytes must be positive"));
        }
        self.ocr.recognition_settings()?;
        Ok(())
    }
}
