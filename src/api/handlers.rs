//! API request handlers.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::{
    convert::convert_upload,
    error::{PdfOcrError, MSG_NO_FILE, MSG_SERVER_FAILED},
    pipeline::input::SourceDocument,
};

use super::types::{ApiState, ErrorResponse, HealthResponse};

/// Router state: the engines plus the status-code policy from
/// [`super::ServerConfig`].
#[derive(Clone)]
pub(crate) struct RouterState {
    pub(crate) api: ApiState,
    pub(crate) strict_status: bool,
}

/// Name of the multipart field carrying the PDF.
pub const FILE_FIELD: &str = "file";

/// `Content-Disposition` of a successful response.
pub const RESULT_DISPOSITION: &str = "attachment; filename=\"ocr-result.pdf\"";

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>PDF OCR</title></head>
<body>
<h1>PDF OCR with Tesseract</h1>
<p>Upload a PDF file to extract text and create a new searchable PDF.</p>
<form action="/api/ocr" method="post" enctype="multipart/form-data">
  <input type="file" name="file" accept="application/pdf" required>
  <button type="submit">Upload and Process</button>
</form>
</body>
</html>
"#;

/// OCR endpoint handler.
///
/// POST /api/ocr
///
/// Accepts multipart form data with a single `file` field. On success the
/// body is the OCR result PDF. Every failure, including a missing field, a
/// malformed body or an oversized upload, produces the JSON
/// [`ErrorResponse`] shape; no partial PDF is ever returned.
pub(crate) async fn ocr_handler(
    State(state): State<RouterState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let source = match read_file_field(multipart).await {
        Ok(source) => source,
        Err(e @ PdfOcrError::NoFileProvided) => {
            return failure(state.strict_status, &e, MSG_NO_FILE);
        }
        Err(e) => {
            error!("Rejected upload: {}", e);
            return failure(state.strict_status, &e, MSG_SERVER_FAILED);
        }
    };

    let api = &state.api;
    match convert_upload(&source, api.backend.as_ref(), api.ocr.as_ref(), &api.config).await {
        Ok(pdf) => (
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (header::CONTENT_DISPOSITION, RESULT_DISPOSITION),
            ],
            pdf,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to process upload '{}': {}", source.name(), e);
            failure(state.strict_status, &e, MSG_SERVER_FAILED)
        }
    }
}

/// Health check endpoint handler.
///
/// GET /health
pub(crate) async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Upload form.
///
/// GET /
pub(crate) async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Find the `file` field.
async fn read_file_field(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<SourceDocument, PdfOcrError> {
    let invalid = PdfOcrError::InvalidUpload;
    let mut multipart = multipart.map_err(|e| invalid(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| invalid(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("upload.pdf").to_string();
        let data = field.bytes().await.map_err(|e| invalid(e.body_text()))?;
        return Ok(SourceDocument::from_bytes(name, data.to_vec()));
    }

    Err(PdfOcrError::NoFileProvided)
}

/// JSON failure body.
///
/// The status is 200 unless strict status is on, in which case input errors
/// are 400 and everything else 500.
fn failure(strict_status: bool, err: &PdfOcrError, message: &str) -> Response {
    (failure_status(strict_status, err), Json(ErrorResponse::new(message))).into_response()
}

fn failure_status(strict_status: bool, err: &PdfOcrError) -> StatusCode {
    match (strict_status, err.is_input_error()) {
        (false, _) => StatusCode::OK,
        (true, true) => StatusCode::BAD_REQUEST,
        (true, false) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
