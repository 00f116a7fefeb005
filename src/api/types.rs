//! API state and response types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{config::OcrConfig, pipeline::ocr::OcrEngine, pipeline::render::PdfBackend};

/// Default request body limit: 100 MB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Settings for the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1` or `0.0.0.0`.
    pub host: String,
    pub port: u16,
    /// Maximum request body size in bytes.
    pub max_upload_bytes: usize,
    /// Report failures with 400/500 instead of 200.
    ///
    /// Off by default: existing clients read the `success` flag of the JSON
    /// body and ignore the status code.
    pub strict_status: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            strict_status: false,
        }
    }
}

/// Shared handler state. Holds engines only; no per-request data.
#[derive(Clone)]
pub struct ApiState {
    pub backend: Arc<dyn PdfBackend>,
    pub ocr: Arc<dyn OcrEngine>,
    pub config: Arc<OcrConfig>,
}

/// JSON body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
