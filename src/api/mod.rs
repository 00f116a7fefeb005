//! HTTP service for PDF OCR.
//!
//! An axum server exposing the stateless upload pipeline of
//! [`crate::convert::convert_upload`].
//!
//! # Endpoints
//!
//! - `GET /` - Upload form
//! - `POST /api/ocr` - OCR an uploaded PDF (multipart field `file`)
//! - `GET /health` - Health check
//!
//! # cURL Examples
//!
//! ```bash
//! curl -F "file=@scan.pdf" -o ocr-result.pdf http://localhost:3000/api/ocr
//! curl http://localhost:3000/health
//! ```
//!
//! Failures are always a JSON body `{"success": false, "error": "..."}`.

mod handlers;
mod server;
mod types;

pub use handlers::{FILE_FIELD, RESULT_DISPOSITION};
pub use server::{create_router, serve};
pub use types::{ApiState, DEFAULT_MAX_UPLOAD_BYTES, ErrorResponse, HealthResponse, ServerConfig};
