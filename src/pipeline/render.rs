//! The PDF engine seam: rasterisation, text-layer extraction and output
//! serialisation.
//!
//! [`PdfBackend`] is the only way the pipelines touch a PDF library. The
//! production implementation is [`crate::pipeline::pdfium::PdfiumBackend`];
//! tests substitute in-memory fakes.

use crate::error::PdfOcrError;
use crate::output::OutputDocument;
use crate::pipeline::input::SourceDocument;
use async_trait::async_trait;
use image::DynamicImage;

/// Size of a source page in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Viewport of this page at `scale`.
    pub fn scaled(self, scale: f32) -> PageSize {
        PageSize::new(self.width * scale, self.height * scale)
    }
}

/// One rasterised source page.
///
/// `viewport` is the page size multiplied by the render scale; the bitmap's
/// pixel dimensions match it (rounded). The output page for this source page
/// takes the viewport dimensions.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based page number.
    pub page_num: usize,
    pub viewport: PageSize,
    pub image: DynamicImage,
}

/// Operations the pipelines need from a PDF engine.
///
/// Implementations must be `Send + Sync`: one backend is shared by every
/// session and every HTTP request. They hold no per-document state.
#[async_trait]
pub trait PdfBackend: Send + Sync {
    /// Decode `source` and return the size of every page, in page order.
    async fn page_sizes(&self, source: &SourceDocument) -> Result<Vec<PageSize>, PdfOcrError>;

    /// Render page `page_index` (0-based) at `scale`.
    async fn rasterize(
        &self,
        source: &SourceDocument,
        page_index: usize,
        scale: f32,
    ) -> Result<PageImage, PdfOcrError>;

    /// Text of the embedded text layer for the whole document.
    ///
    /// Page texts are joined by a blank line; a document with no text layer
    /// yields an empty string.
    async fn extract_text(&self, source: &SourceDocument) -> Result<String, PdfOcrError>;

    /// Serialise `document` to PDF bytes.
    async fn write(&self, document: &OutputDocument) -> Result<Vec<u8>, PdfOcrError>;
}

/// Join per-page texts the way [`PdfBackend::extract_text`] promises.
pub fn join_page_texts<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
