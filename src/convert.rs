//! The server pipeline: one stateless pass over an uploaded document.
//!
//! Unlike the page-aware [`crate::session::OcrSession`], this pipeline never
//! rasterises. It reads the embedded text layer of the whole document, runs
//! OCR once over the raw uploaded bytes as if they were a single image, and
//! writes both texts onto one output page. Handing the raw bytes to the OCR
//! engine is a known simplification: it only yields text when the engine
//! can read the upload directly.

use crate::config::OcrConfig;
use crate::error::PdfOcrError;
use crate::output::{combine_text, OutputDocument, OutputPage};
use crate::pipeline::input::SourceDocument;
use crate::pipeline::ocr::{OcrEngine, OcrInput};
use crate::pipeline::render::PdfBackend;
use crate::progress::LoggingProgress;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Build the one-page OCR result for `source`, returning the PDF bytes.
///
/// # Errors
/// Any engine failure. No partial output is ever produced.
pub async fn convert_upload(
    source: &SourceDocument,
    backend: &dyn PdfBackend,
    ocr: &dyn OcrEngine,
    config: &OcrConfig,
) -> Result<Vec<u8>, PdfOcrError> {
    let start = Instant::now();
    info!("Converting upload '{}' ({} bytes)", source.name(), source.len());

    let embedded = backend.extract_text(source).await?;

    let progress = LoggingProgress::new(source.name());
    let ocr_text = ocr
        .recognize(OcrInput::Encoded(source.bytes()), &config.language, &progress)
        .await?;

    let mut output = OutputDocument::new();
    output.push_page(
        OutputPage::default_size().with_text(combine_text(&embedded, &ocr_text), &config.layout),
    );
    let pdf = backend.write(&output).await?;

    info!(
        "Upload '{}' converted: {} embedded + {} OCR chars, {}ms",
        source.name(),
        embedded.len(),
        ocr_text.len(),
        start.elapsed().as_millis()
    );
    Ok(pdf)
}

/// Write `bytes` to `path` atomically (temp file + rename).
pub async fn write_output(path: &Path, bytes: &[u8]) -> Result<(), PdfOcrError> {
    let write_err = |source| PdfOcrError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}
