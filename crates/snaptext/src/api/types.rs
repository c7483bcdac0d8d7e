//! API state and request/response types.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

use crate::batch::BatchOrchestrator;
use crate::core::ServiceConfig;
use crate::ocr::OcrEngine;
use crate::session::{MemorySessionStore, SessionStore};
use crate::validation::ValidationLimits;
use crate::Result;

/// Name of the signed cookie carrying the session id.
pub const SESSION_COOKIE: &str = "snaptext_session";

/// Multipart field that carries the uploads.
pub const UPLOAD_FIELD: &str = "images";

/// Shared state handed to every handler.
///
/// Built once at startup; nothing in the API layer lives in globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub orchestrator: Arc<BatchOrchestrator>,
    pub cookie_key: Key,
}

impl AppState {
    /// Build state using the engine named in the configuration.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let engine = config.ocr.build_engine()?;
        Self::with_engine(config, engine)
    }

    /// Build state around an explicit engine, with an in-memory session store.
    pub fn with_engine(config: ServiceConfig, engine: Arc<dyn OcrEngine>) -> Result<Self> {
        Self::with_engine_and_store(config, engine, Arc::new(MemorySessionStore::new()))
    }

    pub fn with_engine_and_store(
        config: ServiceConfig,
        engine: Arc<dyn OcrEngine>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        config.validate()?;

        if config.uses_default_secret() {
            tracing::warn!(
                "No secret key configured, using the development default. Session cookies can be forged; \
                 set SNAPTEXT_SECRET_KEY or secret_key in snaptext.toml for production."
            );
        }

        let orchestrator = BatchOrchestrator::from_config(&config, engine, store)?;
        tracing::info!(
            engine = orchestrator.recognizer().engine_name(),
            settings = %orchestrator.recognizer().settings(),
            policy = ?orchestrator.policy(),
            "OCR engine ready"
        );

        Ok(Self {
            cookie_key: derive_cookie_key(config.secret_key_or_default()),
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
        })
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.config.limits
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Stretch an arbitrary-length secret to the 64 bytes the cookie key needs.
pub fn derive_cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Form body of `POST /download-single`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub file_index: Option<String>,
}

impl DownloadForm {
    /// Requested index; anything missing or unparsable means the first entry.
    pub fn index(&self) -> usize {
        self.file_index
            .as_deref()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0)
    }
}
