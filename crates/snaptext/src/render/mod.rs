//! HTML presentation.
//!
//! A single page serves every outcome: the bare upload form, the form with an error
//! banner, and the form followed by results (one result inline, several as a paged view).

use std::sync::OnceLock;

use minijinja::{AutoEscape, Environment, context};
use serde::Serialize;

use crate::types::{ExtractionResult, ExtractionStatus};
use crate::validation::ValidationLimits;
use crate::Result;

pub const PAGE_TEMPLATE: &str = "index.html.jinja";

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn init_template_env() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template(PAGE_TEMPLATE, include_str!("../../templates/index.html.jinja"))?;

    env.set_auto_escape_callback(|name| {
        if name.ends_with(".html.jinja") {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });

    Ok(env)
}

fn template_env() -> Result<&'static Environment<'static>> {
    if let Some(env) = TEMPLATE_ENV.get() {
        return Ok(env);
    }
    let env = init_template_env()?;
    Ok(TEMPLATE_ENV.get_or_init(|| env))
}

/// One row of the results view.
#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub index: usize,
    pub filename: String,
    pub text: String,
    pub size_bytes: u64,
    pub char_count: usize,
    pub status: &'static str,
    pub is_placeholder: bool,
}

impl ResultView {
    pub fn new(index: usize, result: &ExtractionResult) -> Self {
        let status = match result.status {
            ExtractionStatus::Ok => "ok",
            ExtractionStatus::Empty => "empty",
            ExtractionStatus::Error { .. } => "error",
        };
        Self {
            index,
            filename: result.filename.clone(),
            text: result.text.clone(),
            size_bytes: result.size_bytes,
            char_count: result.char_count(),
            status,
            is_placeholder: result.is_placeholder(),
        }
    }
}

/// Everything the page template needs.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub error: Option<String>,
    pub results: Vec<ResultView>,
    /// Whether `results` is the batch stored for the session, so the download forms
    /// will serve what is shown.
    pub downloadable: bool,
    pub allowed_extensions: Vec<String>,
    pub max_file_size_bytes: u64,
    pub max_file_size_label: String,
    pub max_files: usize,
    pub version: &'static str,
}

impl PageContext {
    pub fn new(limits: &ValidationLimits) -> Self {
        Self {
            error: None,
            results: Vec::new(),
            downloadable: false,
            allowed_extensions: limits.allowed_extensions.iter().map(|e| e.to_uppercase()).collect(),
            max_file_size_bytes: limits.max_file_size_bytes,
            max_file_size_label: limits.max_file_size_label(),
            max_files: limits.max_files,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_results(mut self, results: &[ExtractionResult]) -> Self {
        self.results = results
            .iter()
            .enumerate()
            .map(|(i, r)| ResultView::new(i, r))
            .collect();
        self
    }

    pub fn with_downloads(mut self, downloadable: bool) -> Self {
        self.downloadable = downloadable;
        self
    }
}

pub fn render_page(page: &PageContext) -> Result<String> {
    let template = template_env()?.get_template(PAGE_TEMPLATE)?;
    Ok(template.render(context! { page => page })?)
}
