//! Service-wide configuration.

pub mod config;

pub use config::{CONFIG_FILE_NAME, DEV_SECRET_KEY, OcrConfig, OcrEngineKind, ServiceConfig};
