//! Pipeline stages for PDF OCR.
//!
//! Each submodule implements one step, and the engine-facing steps sit
//! behind traits so the orchestrators can be exercised without PDFium or
//! Tesseract installed.
//!
//! ## Data Flow
//!
//! ```text
//! client:  input ──▶ render (per page) ──▶ ocr (per page) ──▶ write
//! server:  input ──▶ extract_text ──▶ ocr (whole file) ──▶ write
//! ```
//!
//! 1. [`input`]: wrap the selected or uploaded bytes as a `SourceDocument`
//! 2. [`render`]: the `PdfBackend` trait for page sizes, rasterisation, text
//!    layer and output serialisation
//! 3. [`pdfium`]: `PdfBackend` on PDFium; runs in `spawn_blocking`
//! 4. [`ocr`]: the `OcrEngine` trait and the Tesseract CLI engine

pub mod input;
pub mod ocr;
pub mod pdfium;
pub mod render;
