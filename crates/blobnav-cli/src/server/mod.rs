//! HTTP server startup and lifecycle management.

mod error;
mod http_server;
mod shutdown;

use axum::Router;
pub use error::{Result, ServerError};
use shutdown::shutdown_signal;

use crate::config::ServerConfig;

/// Binds the configured address and serves `app` until a shutdown signal.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the address cannot be
/// bound, or the server fails while running.
pub async fn serve(app: Router, config: ServerConfig) -> Result<()> {
    http_server::serve_http(app, config).await
}
