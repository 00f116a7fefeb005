//! Input resolution: turn a user-supplied file into a [`SourceDocument`].
//!
//! Both pipelines work on in-memory bytes. PDFium can load a document
//! straight from a byte slice, so nothing is written to disk. The bytes are
//! held in an `Arc<[u8]>` so that each blocking render task can own a handle
//! without copying the document.

use crate::error::PdfOcrError;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// An uploaded or selected PDF. Immutable once read.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    name: String,
    bytes: Arc<[u8]>,
}

impl SourceDocument {
    /// Wrap bytes that were already read, e.g. from a multipart field.
    ///
    /// No validation happens here; the server pipeline deliberately passes
    /// whatever was uploaded to the engines.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a local file, accepting only PDFs.
    ///
    /// A file must carry a `.pdf` extension (case-insensitive) and start with
    /// the `%PDF` magic bytes.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, PdfOcrError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        if !has_pdf_extension(&name) {
            return Err(PdfOcrError::NotAPdf {
                name,
                magic: Vec::new(),
            });
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PdfOcrError::CorruptPdf {
                name: name.clone(),
                detail: format!("cannot read file: {e}"),
            })?;

        let doc = Self::from_bytes(name, bytes);
        doc.ensure_pdf()?;
        debug!("Read {} ({} bytes)", doc.name, doc.len());
        Ok(doc)
    }

    /// File name as selected or uploaded.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw document bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A cheap shared handle to the bytes.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check the `%PDF` magic bytes.
    pub fn ensure_pdf(&self) -> Result<(), PdfOcrError> {
        if self.bytes.starts_with(b"%PDF") {
            Ok(())
        } else {
            Err(PdfOcrError::NotAPdf {
                name: self.name.clone(),
                magic: self.bytes.iter().take(4).copied().collect(),
            })
        }
    }
}

fn has_pdf_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Download name for the OCR result of `source_name`.
///
/// The first `.pdf` in the name is dropped and `_ocr.pdf` appended, so
/// `scan.pdf` becomes `scan_ocr.pdf`.
pub fn result_filename(source_name: &str) -> String {
    format!("{}_ocr.pdf", source_name.replacen(".pdf", "", 1))
}
