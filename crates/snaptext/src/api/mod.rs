//! Browser-facing HTTP server.
//!
//! # Endpoints
//!
//! - `GET /` - Upload form
//! - `POST /` - Upload one or more images (multipart field `images`), re-render with results
//! - `POST /download-single` - Download one stored result (form field `file_index`)
//! - `POST /download-all` - Download every stored result as one text file
//! - `GET /health` - Health check
//!
//! Results are kept per browser session, identified by a signed cookie.
//!
//! # Examples
//!
//! ```no_run
//! use snaptext::api::serve;
//!
//! #[tokio::main]
//! async fn main() -> snaptext::Result<()> {
//!     serve("127.0.0.1", 8080).await
//! }
//! ```
//!
//! # cURL Examples
//!
//! ```bash
//! curl -c jar.txt -F "images=@receipt.png" -F "images=@invoice.jpg" http://localhost:8080/
//! curl -b jar.txt -d "file_index=1" -OJ http://localhost:8080/download-single
//! curl -b jar.txt -X POST -OJ http://localhost:8080/download-all
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::{ApiError, INTERNAL_ERROR_MESSAGE, PAYLOAD_TOO_LARGE_MESSAGE};
pub use server::{create_router, serve, serve_default, serve_with_config};
pub use types::{AppState, DownloadForm, HealthResponse, SESSION_COOKIE, UPLOAD_FIELD, derive_cookie_key};
