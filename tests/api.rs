#![cfg(feature = "server")]
//! The `/api/ocr` handler against in-memory engines.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::{decode_output, FakeBackend, FakeOcr};
use pdf_ocr::api::{create_router, ApiState, ErrorResponse, HealthResponse, ServerConfig};
use pdf_ocr::error::{MSG_NO_FILE, MSG_SERVER_FAILED};
use pdf_ocr::OcrConfig;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "X-BOUNDARY";

fn router(backend: Arc<FakeBackend>, ocr: Arc<FakeOcr>, strict_status: bool) -> Router {
    router_with(
        backend,
        ocr,
        ServerConfig {
            strict_status,
            ..ServerConfig::default()
        },
    )
}

fn router_with(backend: Arc<FakeBackend>, ocr: Arc<FakeOcr>, config: ServerConfig) -> Router {
    let state = ApiState {
        backend,
        ocr,
        config: Arc::new(OcrConfig::default()),
    };
    create_router(state, &config)
}

fn multipart_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
Content-Type: application/pdf\r\n\
\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/ocr")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("content-length", body.len())
        .body(Body::from(body))
        .expect("Failed to build request")
}

async fn json_error(response: axum::response::Response) -> ErrorResponse {
    let bytes = to_bytes(response.into_body(), 1_000_000)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Response JSON parse failed")
}

#[tokio::test]
async fn upload_is_combined_onto_one_page() {
    let backend = Arc::new(FakeBackend::with_pages(vec![]).embedded_text(""));
    let ocr = Arc::new(FakeOcr::returning("HELLO WORLD"));
    let app = router(backend.clone(), ocr.clone(), false);

    let upload = b"%PDF-1.7 scanned bytes";
    let response = app
        .oneshot(multipart_request("file", "scan.pdf", upload))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"ocr-result.pdf\""
    );

    let bytes = to_bytes(response.into_body(), 1_000_000).await.unwrap();
    let doc = decode_output(&bytes);
    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.pages()[0].text(), "\nHELLO WORLD");

    // The OCR engine saw the raw upload.
    assert_eq!(*ocr.encoded_inputs.lock().unwrap(), vec![upload.to_vec()]);
}

#[tokio::test]
async fn embedded_text_comes_first() {
    let backend = Arc::new(FakeBackend::with_pages(vec![]).embedded_text("Invoice 42"));
    let ocr = Arc::new(FakeOcr::returning("stamp: PAID"));
    let app = router(backend, ocr, false);

    let response = app
        .oneshot(multipart_request("file", "invoice.pdf", b"%PDF-1.4"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), 1_000_000).await.unwrap();
    let doc = decode_output(&bytes);
    let page = &doc.pages()[0];
    assert_eq!(page.text(), "Invoice 42\nstamp: PAID");
    assert_eq!(page.width, pdf_ocr::output::DEFAULT_PAGE_WIDTH);
    assert_eq!(page.height, pdf_ocr::output::DEFAULT_PAGE_HEIGHT);
}

#[tokio::test]
async fn missing_file_field_returns_json_failure() {
    let backend = Arc::new(FakeBackend::with_pages(vec![]));
    let ocr = Arc::new(FakeOcr::new());
    let app = router(backend.clone(), ocr.clone(), false);

    let response = app
        .oneshot(multipart_request("document", "scan.pdf", b"%PDF-1.7"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(json_error(response).await, ErrorResponse::new(MSG_NO_FILE));
    assert_eq!(backend.call_count(), 0);
    assert_eq!(ocr.call_count(), 0);
}

#[tokio::test]
async fn missing_file_is_400_in_strict_mode() {
    let app = router(
        Arc::new(FakeBackend::with_pages(vec![])),
        Arc::new(FakeOcr::new()),
        true,
    );

    let response = app
        .oneshot(multipart_request("other", "a.pdf", b"%PDF"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_error(response).await, ErrorResponse::new(MSG_NO_FILE));
}

#[tokio::test]
async fn processing_failure_returns_json_without_pdf() {
    let app = router(
        Arc::new(FakeBackend::with_pages(vec![])),
        Arc::new(FakeOcr::failing_on(1)),
        false,
    );

    let response = app
        .oneshot(multipart_request("file", "scan.pdf", b"%PDF-1.7"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_error(response).await;
    assert!(!body.success);
    assert_eq!(body.error, MSG_SERVER_FAILED);
}

#[tokio::test]
async fn processing_failure_is_500_in_strict_mode() {
    let app = router(
        Arc::new(FakeBackend::with_pages(vec![]).failing_write()),
        Arc::new(FakeOcr::new()),
        true,
    );

    let response = app
        .oneshot(multipart_request("file", "scan.pdf", b"%PDF-1.7"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_error(response).await,
        ErrorResponse::new(MSG_SERVER_FAILED)
    );
}

#[tokio::test]
async fn non_multipart_body_returns_json_failure() {
    let app = router(
        Arc::new(FakeBackend::with_pages(vec![])),
        Arc::new(FakeOcr::new()),
        false,
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/ocr")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_error(response).await,
        ErrorResponse::new(MSG_SERVER_FAILED)
    );
}

#[tokio::test]
async fn oversized_upload_returns_json_failure() {
    let backend = Arc::new(FakeBackend::with_pages(vec![]));
    let ocr = Arc::new(FakeOcr::new());
    let config = ServerConfig {
        max_upload_bytes: 64,
        ..ServerConfig::default()
    };
    let app = router_with(backend.clone(), ocr.clone(), config);

    let response = app
        .oneshot(multipart_request("file", "big.pdf", &[b'A'; 500]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(
        json_error(response).await,
        ErrorResponse::new(MSG_SERVER_FAILED)
    );
    assert_eq!(backend.call_count(), 0);
    assert_eq!(ocr.call_count(), 0);
}

#[tokio::test]
async fn oversized_upload_is_400_in_strict_mode() {
    let config = ServerConfig {
        max_upload_bytes: 64,
        strict_status: true,
        ..ServerConfig::default()
    };
    let app = router_with(
        Arc::new(FakeBackend::with_pages(vec![])),
        Arc::new(FakeOcr::new()),
        config,
    );

    let response = app
        .oneshot(multipart_request("file", "big.pdf", &[b'A'; 500]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_error(response).await,
        ErrorResponse::new(MSG_SERVER_FAILED)
    );
}

#[tokio::test]
async fn strict_status_comes_from_server_config() {
    let state = ApiState {
        backend: Arc::new(FakeBackend::with_pages(vec![])),
        ocr: Arc::new(FakeOcr::failing_on(1)),
        config: Arc::new(OcrConfig::default()),
    };
    let config = ServerConfig {
        strict_status: true,
        ..ServerConfig::default()
    };
    let app = create_router(state, &config);

    let response = app
        .oneshot(multipart_request("file", "scan.pdf", b"%PDF-1.7"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_and_index() {
    let app = router(
        Arc::new(FakeBackend::with_pages(vec![])),
        Arc::new(FakeOcr::new()),
        false,
    );

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), 10_000).await.unwrap();
    let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health.status, "healthy");

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), 10_000).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("action=\"/api/ocr\""));
    assert!(html.contains("accept=\"application/pdf\""));
}
