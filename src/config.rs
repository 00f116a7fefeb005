//! Configuration types for OCR runs.
//!
//! Every knob shared by the client and server pipelines lives in
//! [`OcrConfig`], built via its [`OcrConfigBuilder`]. Settings that only make
//! sense for the HTTP service live in `crate::api::ServerConfig`.

use crate::error::PdfOcrError;
use serde::{Deserialize, Serialize};

/// Placement of the recognized text on an output page.
///
/// Coordinates follow PDF conventions: the origin is the bottom-left corner,
/// so the block's baseline sits `offset_y` units below the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextLayout {
    /// Distance from the left edge. Default: 50.
    pub offset_x: f32,
    /// Distance below the top edge. Default: 50.
    pub offset_y: f32,
    /// Font size in points. Default: 12.
    pub font_size: f32,
    /// Line height as a multiple of `font_size`. Default: 1.2.
    pub line_spacing: f32,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            offset_x: 50.0,
            offset_y: 50.0,
            font_size: 12.0,
            line_spacing: 1.2,
        }
    }
}

/// Configuration for an OCR run.
///
/// # Example
/// ```rust
/// use pdf_ocr::OcrConfig;
///
/// let config = OcrConfig::builder()
///     .render_scale(2.0)
///     .language("deu")
///     .build()
///     .unwrap();
/// assert_eq!(config.language, "deu");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Magnification applied when rasterising each page. Default: 3.0.
    ///
    /// Rendering at three times the native size gives Tesseract glyphs large
    /// enough to recognise reliably. The output page takes the same scaled
    /// dimensions.
    pub render_scale: f32,

    /// Tesseract language code. Default: `"eng"`.
    pub language: String,

    /// Where and how large the recognized text is drawn.
    pub layout: TextLayout,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            render_scale: 3.0,
            language: "eng".to_string(),
            layout: TextLayout::default(),
        }
    }
}

impl OcrConfig {
    /// Create a new builder for `OcrConfig`.
    pub fn builder() -> OcrConfigBuilder {
        OcrConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`OcrConfig`].
#[derive(Debug)]
pub struct OcrConfigBuilder {
    config: OcrConfig,
}

impl OcrConfigBuilder {
    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    pub fn layout(mut self, layout: TextLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.config.layout.font_size = size;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<OcrConfig, PdfOcrError> {
        let c = &self.config;
        if !(c.render_scale > 0.0 && c.render_scale <= 10.0) {
            return Err(PdfOcrError::InvalidConfig(format!(
                "render scale must be in (0, 10], got {}",
                c.render_scale
            )));
        }
        if c.language.trim().is_empty() {
            return Err(PdfOcrError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if !(c.layout.font_size > 0.0) {
            return Err(PdfOcrError::InvalidConfig(format!(
                "font size must be positive, got {}",
                c.layout.font_size
            )));
        }
        Ok(self.config)
    }
}
