//! In-memory engines shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, RgbImage};
use pdf_ocr::{
    OcrEngine, OcrInput, OutputDocument, PageImage, PageSize, PdfBackend, PdfOcrError,
    PipelineState, RecognitionProgress, SessionObserver, SourceDocument,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const LETTER: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};

pub const A5: PageSize = PageSize {
    width: 420.0,
    height: 595.0,
};

/// A [`PdfBackend`] with fixed page sizes and text layer.
///
/// `write` serialises the document as JSON so tests can read back exactly
/// what would have been drawn.
pub struct FakeBackend {
    pub sizes: Vec<PageSize>,
    pub embedded_text: String,
    pub fail_write: bool,
    pub rasterized: Mutex<Vec<usize>>,
    pub calls: AtomicUsize,
}

impl FakeBackend {
    pub fn with_pages(sizes: Vec<PageSize>) -> Self {
        Self {
            sizes,
            embedded_text: String::new(),
            fail_write: false,
            rasterized: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn embedded_text(mut self, text: &str) -> Self {
        self.embedded_text = text.to_string();
        self
    }

    pub fn failing_write(mut self) -> Self {
        self.fail_write = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rasterized_pages(&self) -> Vec<usize> {
        self.rasterized.lock().unwrap().clone()
    }
}

#[async_trait]
impl PdfBackend for FakeBackend {
    async fn page_sizes(&self, _source: &SourceDocument) -> Result<Vec<PageSize>, PdfOcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.sizes.clone())
    }

    async fn rasterize(
        &self,
        _source: &SourceDocument,
        page_index: usize,
        scale: f32,
    ) -> Result<PageImage, PdfOcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let size = self
            .sizes
            .get(page_index)
            .copied()
            .ok_or(PdfOcrError::PageOutOfRange {
                page: page_index + 1,
                total: self.sizes.len(),
            })?;
        self.rasterized.lock().unwrap().push(page_index + 1);
        Ok(PageImage {
            page_num: page_index + 1,
            viewport: size.scaled(scale),
            image: DynamicImage::ImageRgb8(RgbImage::new(2, 2)),
        })
    }

    async fn extract_text(&self, _source: &SourceDocument) -> Result<String, PdfOcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.embedded_text.clone())
    }

    async fn write(&self, document: &OutputDocument) -> Result<Vec<u8>, PdfOcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_write {
            return Err(PdfOcrError::AssemblyFailed("disk full".into()));
        }
        serde_json::to_vec(document).map_err(|e| PdfOcrError::AssemblyFailed(e.to_string()))
    }
}

/// Decode what [`FakeBackend::write`] produced.
pub fn decode_output(bytes: &[u8]) -> OutputDocument {
    serde_json::from_slice(bytes).unwrap()
}

/// An [`OcrEngine`] returning `"text of call N"` (1-based) per call.
///
/// Reports progress 0.0, 0.5 and 1.0 on every call. Fails on call
/// `fail_on` when set.
pub struct FakeOcr {
    pub fail_on: Option<usize>,
    pub fixed_text: Option<String>,
    pub calls: AtomicUsize,
    pub encoded_inputs: Mutex<Vec<Vec<u8>>>,
    pub languages: Mutex<Vec<String>>,
}

impl FakeOcr {
    pub fn new() -> Self {
        Self {
            fail_on: None,
            fixed_text: None,
            calls: AtomicUsize::new(0),
            encoded_inputs: Mutex::new(Vec::new()),
            languages: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::new()
        }
    }

    pub fn returning(text: &str) -> Self {
        Self {
            fixed_text: Some(text.to_string()),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn recognize(
        &self,
        input: OcrInput<'_>,
        language: &str,
        progress: &dyn RecognitionProgress,
    ) -> Result<String, PdfOcrError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.languages.lock().unwrap().push(language.to_string());
        if let OcrInput::Encoded(bytes) = input {
            self.encoded_inputs.lock().unwrap().push(bytes.to_vec());
        }

        progress.on_progress(0.0);
        progress.on_progress(0.5);
        if self.fail_on == Some(call) {
            return Err(PdfOcrError::OcrFailed(format!("engine crashed on call {call}")));
        }
        progress.on_progress(1.0);

        Ok(self
            .fixed_text
            .clone()
            .unwrap_or_else(|| format!("text of call {call}")))
    }
}

/// Records every state snapshot a session publishes.
#[derive(Default)]
pub struct RecordingObserver {
    pub states: Mutex<Vec<PipelineState>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshots(&self) -> Vec<PipelineState> {
        self.states.lock().unwrap().clone()
    }

    pub fn progress_values(&self) -> Vec<u8> {
        self.snapshots().iter().map(|s| s.progress).collect()
    }

    pub fn clear(&self) {
        self.states.lock().unwrap().clear();
    }
}

impl SessionObserver for RecordingObserver {
    fn on_state_change(&self, state: &PipelineState) {
        self.states.lock().unwrap().push(state.clone());
    }
}

pub fn sample_pdf(name: &str) -> SourceDocument {
    SourceDocument::from_bytes(name, b"%PDF-1.7\n%fake\n".to_vec())
}
