//! Error types for the pdf-ocr library.
//!
//! Every failure inside a pipeline is a [`PdfOcrError`]. The pipelines catch
//! it exactly once at their boundary, log the detailed variant, and surface
//! one of the generic user-facing messages below. The specific failing step
//! is never shown to the end user.

use std::path::PathBuf;
use thiserror::Error;

/// Shown when a client submission is made without a selected file.
pub const MSG_SELECT_FILE: &str = "Please select a file";

/// Shown when any client pipeline step fails.
pub const MSG_CLIENT_FAILED: &str = "Failed to process PDF. See logs for details.";

/// Returned by the HTTP endpoint when the multipart body has no `file` field.
pub const MSG_NO_FILE: &str = "No file provided";

/// Returned by the HTTP endpoint when processing fails.
pub const MSG_SERVER_FAILED: &str = "Failed to process PDF";

/// All errors returned by the pdf-ocr library.
#[derive(Debug, Error)]
pub enum PdfOcrError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No source document was supplied.
    #[error("No file provided")]
    NoFileProvided,

    /// The bytes do not start with the `%PDF` magic.
    #[error("'{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: Vec<u8> },

    /// The upload could not be read: not multipart, malformed, or over the
    /// size limit.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDFium could not parse the document.
    #[error("PDF '{name}' is corrupt: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// The document is encrypted.
    #[error("PDF '{name}' is encrypted and requires a password")]
    PasswordRequired { name: String },

    /// Requested page index does not exist.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium-render returned an error while rendering a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The embedded text layer could not be read.
    #[error("Text extraction failed: {0}")]
    TextExtractionFailed(String),

    /// Building or saving the output PDF failed.
    #[error("Failed to assemble output PDF: {0}")]
    AssemblyFailed(String),

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR engine ran but failed.
    #[error("OCR failed: {0}")]
    OcrFailed(String),

    /// The OCR engine binary could not be started at all.
    #[error(
        "OCR engine '{binary}' is not available: {reason}\n\
Install tesseract or pass --tesseract /path/to/tesseract."
    )]
    OcrEngineUnavailable { binary: String, reason: String },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/dir/containing/libpdfium or pass --pdfium-lib."
    )]
    PdfiumBindingFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfOcrError {
    /// `true` for errors caused by what the user supplied rather than by a
    /// processing step.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PdfOcrError::NoFileProvided
                | PdfOcrError::NotAPdf { .. }
                | PdfOcrError::InvalidUpload(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rasterisation_display_names_page() {
        let e = PdfOcrError::RasterisationFailed {
            page: 3,
            detail: "bad bitmap".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 3"), "got: {msg}");
        assert!(msg.contains("bad bitmap"));
    }

    #[test]
    fn not_a_pdf_display() {
        let e = PdfOcrError::NotAPdf {
            name: "photo.png".into(),
            magic: b"\x89PNG".to_vec(),
        };
        assert!(e.to_string().contains("photo.png"));
    }

    #[test]
    fn engine_unavailable_mentions_binary() {
        let e = PdfOcrError::OcrEngineUnavailable {
            binary: "tesseract".into(),
            reason: "No such file or directory".into(),
        };
        assert!(e.to_string().contains("'tesseract'"));
    }

    #[test]
    fn input_errors_are_classified() {
        assert!(PdfOcrError::NoFileProvided.is_input_error());
        assert!(PdfOcrError::InvalidUpload("length limit exceeded".into()).is_input_error());
        assert!(!PdfOcrError::OcrFailed("boom".into()).is_input_error());
        assert!(!PdfOcrError::Internal("task panicked".into()).is_input_error());
    }
}
