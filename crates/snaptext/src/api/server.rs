//! API server setup and configuration.

use std::any::Any;
use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::core::ServiceConfig;
use crate::{Result, SnaptextError};

use super::{
    handlers::{
        download_all_handler, download_single_handler, health_handler, index_handler, panic_page,
        status_page_handler, upload_handler,
    },
    types::AppState,
};

/// Create the router with all routes configured.
///
/// Public so the service can be mounted inside a larger application, or driven directly
/// in tests with `tower::ServiceExt::oneshot`.
///
/// # Examples
///
/// ```no_run
/// use snaptext::{ServiceConfig, api::{AppState, create_router}};
///
/// # fn main() -> snaptext::Result<()> {
/// let state = AppState::from_config(ServiceConfig::default())?;
/// let router = create_router(state);
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_request_body_bytes;
    let panic_limits = state.config.limits.clone();

    Router::new()
        .route("/", get(index_handler).post(upload_handler))
        .route("/download-single", post(download_single_handler))
        .route("/download-all", post(download_all_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(middleware::map_response_with_state(state.clone(), status_page_handler))
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            panic_page(&panic_limits, panic)
        }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server, loading configuration from `snaptext.toml` discovery and the
/// environment. `host` and `port` take precedence over both.
pub async fn serve(host: impl AsRef<str>, port: u16) -> Result<()> {
    let mut config = ServiceConfig::load(None)?;
    config.host = host.as_ref().to_string();
    config.port = port;
    serve_with_config(config).await
}

/// Start the server with an explicit configuration.
///
/// # Examples
///
/// ```no_run
/// use snaptext::{ServiceConfig, api::serve_with_config};
///
/// #[tokio::main]
/// async fn main() -> snaptext::Result<()> {
///     let config = ServiceConfig::from_toml_file("snaptext.toml")?;
///     serve_with_config(config).await
/// }
/// ```
pub async fn serve_with_config(config: ServiceConfig) -> Result<()> {
    let ip: IpAddr = config
        .host
        .parse()
        .map_err(|e| SnaptextError::config(format!("Invalid host address '{}': {}", config.host, e)))?;
    let addr = SocketAddr::new(ip, config.port);

    tracing::info!(
        "Upload limits: {} per file, {} files per batch, {} bytes per request",
        config.limits.max_file_size_label(),
        config.limits.max_files,
        config.max_request_body_bytes
    );

    let state = AppState::from_config(config)?;
    let app = create_router(state);

    tracing::info!("Starting snaptext server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(SnaptextError::Io)?;

    axum::serve(listener, app)
        .await
        .map_err(|e| SnaptextError::Other(e.to_string()))?;

    Ok(())
}

/// Start the server on the configured (or default) host and port.
pub async fn serve_default() -> Result<()> {
    serve_with_config(ServiceConfig::load(None)?).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_router() {
        let state = AppState::from_config(ServiceConfig::default()).unwrap();
        let router = create_router(state);
        assert!(size_of_val(&router) > 0);
    }

    #[tokio::test]
    async fn test_invalid_host_is_config_error() {
        let config = ServiceConfig {
            host: "not an address".to_string(),
            ..Default::default()
        };
        let err = serve_with_config(config).await.unwrap_err();
        assert!(matches!(err, SnaptextError::Config { .. }));
    }
}
