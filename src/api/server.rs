//! Router construction and server startup.

use std::net::SocketAddr;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::PdfOcrError;

use super::{
    handlers::{RouterState, health_handler, index_handler, ocr_handler},
    types::{ApiState, ServerConfig},
};

/// Build the API router.
///
/// `config.max_upload_bytes` replaces axum's default 2 MB body limit. The
/// limit is enforced while the multipart stream is read, so an oversized
/// upload surfaces inside the handler and gets the JSON failure body.
/// `config.strict_status` selects the failure status codes.
pub fn create_router(state: ApiState, config: &ServerConfig) -> Router {
    let state = RouterState {
        api: state,
        strict_status: config.strict_status,
    };
    Router::new()
        .route("/", get(index_handler))
        .route("/api/ocr", post(ocr_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `config.host:config.port` and serve until the process is stopped.
///
/// # Errors
/// [`PdfOcrError::InvalidConfig`] for an unparsable address,
/// [`PdfOcrError::Internal`] when binding or serving fails.
pub async fn serve(state: ApiState, config: &ServerConfig) -> Result<(), PdfOcrError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| PdfOcrError::InvalidConfig(format!("bad listen address: {e}")))?;

    let app = create_router(state, config);

    info!(
        "Upload size limit: {} MB ({} bytes)",
        config.max_upload_bytes / (1024 * 1024),
        config.max_upload_bytes
    );
    info!("Starting PDF OCR API server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| PdfOcrError::Internal(format!("cannot bind {addr}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| PdfOcrError::Internal(e.to_string()))?;

    Ok(())
}
