//! # pdf-ocr
//!
//! Make scanned PDFs searchable with Tesseract OCR.
//!
//! Two pipelines share the same engines:
//!
//! - **Session** ([`OcrSession`]): an interactive, page-aware run. Every page
//!   is rasterised, recognised and written to an output page of the same
//!   size, with overall progress reported as it goes.
//! - **Upload** ([`convert_upload`]): a stateless one-shot pass used by the
//!   HTTP service. The embedded text layer and the OCR text of the whole
//!   upload are combined on a single output page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input   validate and share the source bytes
//!  ├─ 2. Render  rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. OCR     tesseract CLI per page image
//!  └─ 4. Output  plain-text PDF, one page per source page
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_ocr::{OcrConfig, OcrSession, PdfiumBackend, SourceDocument, TesseractEngine};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = OcrSession::new(
//!         Arc::new(PdfiumBackend::bind_from_env()?),
//!         Arc::new(TesseractEngine::default()),
//!         OcrConfig::default(),
//!     );
//!     session.select_file(Some(SourceDocument::from_path("scan.pdf").await?));
//!     match session.submit().await {
//!         Some(result) => std::fs::write(&result.filename, &result.pdf)?,
//!         None => eprintln!("{}", session.state().error.unwrap_or_default()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `pdf-ocr` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `server` | on      | Enables the [`api`] module (axum + tower-http) |
//!
//! Disable both when using only the library:
//! ```toml
//! pdf-ocr = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

#[cfg(feature = "server")]
pub mod api;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{OcrConfig, OcrConfigBuilder, TextLayout};
pub use convert::{convert_upload, write_output};
pub use error::PdfOcrError;
pub use output::{OcrResult, OutputDocument, OutputPage, TextBlock};
pub use pipeline::input::{result_filename, SourceDocument};
pub use pipeline::ocr::{OcrEngine, OcrInput, TesseractEngine, TesseractSettings};
pub use pipeline::pdfium::PdfiumBackend;
pub use pipeline::render::{PageImage, PageSize, PdfBackend};
pub use progress::{
    LoggingProgress, NoopProgress, RecognitionProgress, SessionObserver, StateObserver,
};
pub use session::{OcrSession, PipelineState, Stage};
