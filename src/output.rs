//! The output document model.
//!
//! An [`OutputDocument`] is an append-only list of pages, each carrying the
//! recognized text as a [`TextBlock`]. It is pure data: turning it into PDF
//! bytes is the job of [`crate::pipeline::render::PdfBackend::write`], which
//! keeps the assembly logic testable without a PDF engine.

use crate::config::TextLayout;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Width of the default (A4) output page in points.
pub const DEFAULT_PAGE_WIDTH: f32 = 595.28;

/// Height of the default (A4) output page in points.
pub const DEFAULT_PAGE_HEIGHT: f32 = 841.89;

/// One block of text drawn at a fixed anchor.
///
/// `x`/`y` is the baseline of the first line. Each `\n` in `text` starts a
/// new line `line_height` units lower. No wrapping happens; text running
/// past the page edge is clipped by viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub line_height: f32,
    pub text: String,
}

impl TextBlock {
    /// Baseline position of each line, skipping empty lines but keeping
    /// their vertical space.
    pub fn lines(&self) -> impl Iterator<Item = (f32, &str)> + '_ {
        self.text
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(move |(i, line)| (self.y - i as f32 * self.line_height, line))
    }
}

/// A page of the output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputPage {
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<TextBlock>,
}

impl OutputPage {
    /// An empty page of the given size.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// An empty A4 page.
    pub fn default_size() -> Self {
        Self::new(DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT)
    }

    /// Add `text` anchored `layout.offset_x` from the left edge and
    /// `layout.offset_y` below the top edge.
    pub fn with_text(mut self, text: impl Into<String>, layout: &TextLayout) -> Self {
        self.blocks.push(TextBlock {
            x: layout.offset_x,
            y: self.height - layout.offset_y,
            font_size: layout.font_size,
            line_height: layout.font_size * layout.line_spacing,
            text: text.into(),
        });
        self
    }

    /// All text drawn on this page, blocks joined by newlines.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// An in-memory PDF being assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pages: Vec<OutputPage>,
}

impl OutputDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page. Pages are never removed or modified afterwards.
    pub fn push_page(&mut self, page: OutputPage) {
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[OutputPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// The finished product of a client session.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrResult {
    /// Suggested download name, e.g. `scan_ocr.pdf`.
    pub filename: String,
    /// Serialized output PDF.
    pub pdf: Arc<[u8]>,
    /// Recognized text of every page, pages separated by a blank line.
    pub text: String,
    /// Number of pages in the output PDF.
    pub page_count: usize,
}

/// Text for the single server page: embedded text layer, a line break, then
/// the OCR text.
pub fn combine_text(embedded: &str, ocr: &str) -> String {
    format!("{embedded}\n{ocr}")
}
