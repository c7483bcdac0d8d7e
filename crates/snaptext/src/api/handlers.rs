//! API request handlers.

use std::any::Any;

use axum::{
    Json,
    extract::{Form, Multipart, State, multipart::MultipartError, rejection::FormRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use axum_extra::{
    extract::cookie::{Cookie, SameSite, SignedCookieJar},
    response::Attachment,
};
use chrono::Utc;

use crate::download::{TextDownload, render_all, render_single};
use crate::render::{PageContext, render_page};
use crate::session::SessionId;
use crate::types::UploadItem;
use crate::validation::ValidationLimits;

use super::{
    error::{ApiError, INTERNAL_ERROR_MESSAGE, error_page},
    types::{AppState, DownloadForm, HealthResponse, SESSION_COOKIE, UPLOAD_FIELD},
};

fn session_from(jar: &SignedCookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE).map(|cookie| SessionId::from(cookie.value()))
}

fn session_cookie(session: &SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn multipart_error(error: MultipartError, limits: &ValidationLimits) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::info!("Upload rejected: {}", error.body_text());
        ApiError::payload_too_large(limits)
    } else {
        tracing::info!("Malformed upload: {}", error.body_text());
        ApiError::bad_request(format!("Invalid upload: {}", error.body_text()), limits)
    }
}

fn attachment(download: TextDownload) -> Attachment<String> {
    Attachment::new(download.body)
        .filename(download.filename)
        .content_type("text/plain; charset=utf-8")
}

/// Upload form.
///
/// GET /
pub async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let page = PageContext::new(state.limits());
    render_page(&page)
        .map(Html)
        .map_err(|e| ApiError::internal(e, state.limits()))
}

/// Upload endpoint handler.
///
/// POST /
///
/// Accepts multipart form data with one or more `images` fields. Always re-renders the
/// page: validation problems and "nothing extracted" appear as the error banner with a
/// 200; only oversized bodies (413) and internal faults (500) change the status.
pub async fn upload_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut multipart: Multipart,
) -> Result<(SignedCookieJar, Html<String>), ApiError> {
    let limits = state.limits();
    let mut items = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limits))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| multipart_error(e, limits))?;
        items.push(UploadItem::new(filename, data.to_vec()));
    }

    let session = session_from(&jar).unwrap_or_else(SessionId::generate);
    tracing::info!(session = %session, files = items.len(), "Processing upload");

    let outcome = state.orchestrator.process(&session, items).await;

    // Only a successful batch is stored; otherwise the forms would serve the previous one.
    let mut page = PageContext::new(limits)
        .with_results(&outcome.results)
        .with_downloads(outcome.is_success());
    if let Some(error) = outcome.error {
        page = page.with_error(error);
    }

    let html = render_page(&page).map_err(|e| ApiError::internal(e, limits))?;
    Ok((jar.add(session_cookie(&session)), Html(html)))
}

/// Single-result download.
///
/// POST /download-single
///
/// Form field `file_index` selects the entry; missing or unparsable means 0. Responds 404
/// when the session holds no batch or the index is out of range.
pub async fn download_single_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    form: Result<Form<DownloadForm>, FormRejection>,
) -> Result<Attachment<String>, ApiError> {
    let index = form.map(|Form(form)| form.index()).unwrap_or(0);
    let batch = session_from(&jar).and_then(|session| state.orchestrator.store().get(&session));

    let download = render_single(batch.as_ref(), index).map_err(|e| ApiError::from_error(e, state.limits()))?;
    tracing::info!(index, filename = %download.filename, "Serving single download");
    Ok(attachment(download))
}

/// Combined download of every stored result.
///
/// POST /download-all
pub async fn download_all_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<Attachment<String>, ApiError> {
    let batch = session_from(&jar).and_then(|session| state.orchestrator.store().get(&session));
    let download = render_all(batch.as_ref(), Utc::now()).map_err(|e| ApiError::from_error(e, state.limits()))?;
    tracing::info!(filename = %download.filename, "Serving combined download");
    Ok(attachment(download))
}

/// Health check endpoint handler.
///
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Re-render bare 413/500 responses produced below the handlers (body limit layer,
/// extractor rejections) as the upload page.
pub async fn status_page_handler(State(state): State<AppState>, response: Response) -> Response {
    let status = response.status();
    if status != StatusCode::PAYLOAD_TOO_LARGE && status != StatusCode::INTERNAL_SERVER_ERROR {
        return response;
    }

    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));
    if is_html {
        return response;
    }

    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(state.limits()).into_response()
    } else {
        tracing::error!("Internal server error response from inner service");
        error_page(status, INTERNAL_ERROR_MESSAGE, state.limits())
    }
}

/// Panic handler for `CatchPanicLayer`.
pub fn panic_page(limits: &ValidationLimits, panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Internal server error: handler panicked: {}", detail);
    error_page(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE, limits)
}
