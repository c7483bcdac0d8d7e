//! API error responses.
//!
//! Browser-facing failures re-render the upload page with an error banner and the
//! matching status code; missing downloads get a short plain-text 404.

use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};

use crate::render::{PageContext, render_page};
use crate::validation::ValidationLimits;
use crate::SnaptextError;

pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "File size exceeds the maximum allowed limit.";

pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred. Please try again.";

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Page {
        status: StatusCode,
        message: String,
        limits: Box<ValidationLimits>,
    },
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn payload_too_large(limits: &ValidationLimits) -> Self {
        Self::Page {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: PAYLOAD_TOO_LARGE_MESSAGE.to_string(),
            limits: Box::new(limits.clone()),
        }
    }

    pub fn bad_request(message: impl Into<String>, limits: &ValidationLimits) -> Self {
        Self::Page {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            limits: Box::new(limits.clone()),
        }
    }

    /// Logs `error` in full; the client only sees the generic message.
    pub fn internal(error: SnaptextError, limits: &ValidationLimits) -> Self {
        tracing::error!("Internal server error: {}", error);
        Self::Page {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            limits: Box::new(limits.clone()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Page { status, .. } => *status,
        }
    }

    /// Map a library error to a response: `NotFound` stays a 404, anything else is internal.
    pub fn from_error(error: SnaptextError, limits: &ValidationLimits) -> Self {
        match error {
            SnaptextError::NotFound(message) => Self::NotFound(message),
            other => Self::internal(other, limits),
        }
    }
}

/// The upload page with an error banner, rendered with `status`.
pub fn error_page(status: StatusCode, message: &str, limits: &ValidationLimits) -> Response {
    let page = PageContext::new(limits).with_error(message);
    match render_page(&page) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                message.to_string(),
            )
                .into_response()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                message,
            )
                .into_response(),
            Self::Page {
                status,
                message,
                limits,
            } => error_page(status, &message, &limits),
        }
    }
}
