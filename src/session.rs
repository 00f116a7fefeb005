//! The client pipeline: an interactive OCR session over one selected file.
//!
//! An [`OcrSession`] owns a [`PipelineState`] that a front-end renders
//! (progress bar, status line, error line, download link). The front-end
//! drives it with [`OcrSession::select_file`] and [`OcrSession::submit`], and
//! receives every state change through an optional
//! [`SessionObserver`](crate::progress::SessionObserver).
//!
//! ## Stages
//!
//! ```text
//! Idle ──submit──▶ Submitted ──▶ Processing{1..N} ──▶ Finalizing ──▶ Complete
//!                      │               │                   │
//!                      └───────────────┴───────────────────┴──▶ Error
//! ```
//!
//! Pages are processed strictly in order: page *i* is rasterised, recognised
//! and appended before page *i + 1* is touched, so progress only moves
//! forward and output page *i* always carries the text of source page *i*.
//! A failure on any page aborts the run and discards every page already
//! done.

use crate::config::OcrConfig;
use crate::error::{PdfOcrError, MSG_CLIENT_FAILED, MSG_SELECT_FILE};
use crate::output::{OcrResult, OutputDocument, OutputPage};
use crate::pipeline::input::{result_filename, SourceDocument};
use crate::pipeline::ocr::{OcrEngine, OcrInput};
use crate::pipeline::render::PdfBackend;
use crate::progress::{overall_percent, RecognitionProgress, StateObserver};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Status line while the output PDF is serialised.
pub const STATUS_FINALIZING: &str = "Finalizing PDF...";

/// Status line after a successful run.
pub const STATUS_COMPLETE: &str = "Processing complete!";

/// Where a session is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Nothing running; initial stage.
    #[default]
    Idle,
    /// A submission was accepted and state was reset.
    Submitted,
    /// Working on page `page` (1-based) of `total`.
    Processing { page: usize, total: usize },
    /// Serialising the output document.
    Finalizing,
    /// A result is available.
    Complete,
    /// The last run failed; `PipelineState::error` says so.
    Error,
}

/// Everything a front-end needs to render a session.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    /// Currently selected file.
    pub file: Option<SourceDocument>,
    /// Overall progress, 0–100.
    pub progress: u8,
    /// Human-readable status line.
    pub status: String,
    /// User-facing error line.
    pub error: Option<String>,
    /// Downloadable result of the last successful run.
    pub result: Option<OcrResult>,
    pub stage: Stage,
}

impl PipelineState {
    /// A run is between submission and completion or failure.
    pub fn is_running(&self) -> bool {
        matches!(
            self.stage,
            Stage::Submitted | Stage::Processing { .. } | Stage::Finalizing
        )
    }

    /// The submit action is enabled.
    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.is_running()
    }
}

/// A client OCR session.
///
/// # Example
/// ```rust,no_run
/// use pdf_ocr::{OcrConfig, OcrSession, PdfiumBackend, SourceDocument, TesseractEngine};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let session = OcrSession::new(
///     Arc::new(PdfiumBackend::bind(None)?),
///     Arc::new(TesseractEngine::default()),
///     OcrConfig::default(),
/// );
/// session.select_file(Some(SourceDocument::from_path("scan.pdf").await?));
/// if let Some(result) = session.submit().await {
///     std::fs::write(&result.filename, &result.pdf)?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct OcrSession {
    backend: Arc<dyn PdfBackend>,
    ocr: Arc<dyn OcrEngine>,
    config: OcrConfig,
    observer: Option<StateObserver>,
    state: Mutex<PipelineState>,
}

impl OcrSession {
    pub fn new(backend: Arc<dyn PdfBackend>, ocr: Arc<dyn OcrEngine>, config: OcrConfig) -> Self {
        Self {
            backend,
            ocr,
            config,
            observer: None,
            state: Mutex::new(PipelineState::default()),
        }
    }

    /// Receive a snapshot of the state after every change.
    pub fn with_observer(mut self, observer: StateObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> PipelineState {
        self.lock().clone()
    }

    pub fn can_submit(&self) -> bool {
        self.lock().can_submit()
    }

    /// Replace the selected file and clear the previous result, error,
    /// progress and status.
    pub fn select_file(&self, file: Option<SourceDocument>) {
        self.update(|s| {
            s.file = file;
            s.result = None;
            s.error = None;
            s.progress = 0;
            s.status.clear();
        });
    }

    /// Run the pipeline on the selected file.
    ///
    /// Returns the result on success. Every failure is recorded in the state
    /// as a user-facing message and `None` is returned; a submission while a
    /// run is active is ignored.
    pub async fn submit(&self) -> Option<OcrResult> {
        let source = {
            let mut state = self.lock();
            if state.is_running() {
                warn!("Submission ignored: a run is already in progress");
                return None;
            }
            match state.file.clone() {
                Some(file) => {
                    state.stage = Stage::Submitted;
                    state.error = None;
                    state.result = None;
                    state.progress = 0;
                    state.status.clear();
                    let snapshot = state.clone();
                    drop(state);
                    self.notify(&snapshot);
                    file
                }
                None => {
                    state.error = Some(MSG_SELECT_FILE.to_string());
                    let snapshot = state.clone();
                    drop(state);
                    self.notify(&snapshot);
                    return None;
                }
            }
        };

        match self.run(&source).await {
            Ok(result) => {
                self.update(|s| {
                    s.result = Some(result.clone());
                    s.progress = 100;
                    s.status = STATUS_COMPLETE.to_string();
                    s.stage = Stage::Complete;
                });
                Some(result)
            }
            Err(e) => {
                error!("Failed to process '{}': {}", source.name(), e);
                self.update(|s| {
                    s.error = Some(MSG_CLIENT_FAILED.to_string());
                    s.progress = 0;
                    s.status.clear();
                    s.result = None;
                    s.stage = Stage::Error;
                });
                None
            }
        }
    }

    async fn run(&self, source: &SourceDocument) -> Result<OcrResult, PdfOcrError> {
        let start = Instant::now();
        info!("Starting OCR of {}", source.name());

        let sizes = self.backend.page_sizes(source).await?;
        let total = sizes.len();

        let mut output = OutputDocument::new();
        let mut texts = Vec::with_capacity(total);

        for page_index in 0..total {
            let page_num = page_index + 1;
            self.update(|s| {
                s.stage = Stage::Processing {
                    page: page_num,
                    total,
                };
                s.status = format!("Processing page {page_num} of {total}...");
            });

            let page = self
                .backend
                .rasterize(source, page_index, self.config.render_scale)
                .await?;

            let progress = PageProgress {
                session: self,
                page_num,
                total,
            };
            let text = self
                .ocr
                .recognize(OcrInput::Bitmap(&page.image), &self.config.language, &progress)
                .await?;
            progress.on_progress(1.0);

            output.push_page(
                OutputPage::new(page.viewport.width, page.viewport.height)
                    .with_text(text.as_str(), &self.config.layout),
            );
            debug!("Page {}/{}: {} chars", page_num, total, text.len());
            texts.push(text);
        }

        self.update(|s| {
            s.stage = Stage::Finalizing;
            s.status = STATUS_FINALIZING.to_string();
        });
        let pdf = self.backend.write(&output).await?;

        info!(
            "OCR of {} complete: {} pages in {}ms",
            source.name(),
            total,
            start.elapsed().as_millis()
        );

        Ok(OcrResult {
            filename: result_filename(source.name()),
            pdf: pdf.into(),
            text: texts.join("\n\n"),
            page_count: output.page_count(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update(&self, f: impl FnOnce(&mut PipelineState)) {
        let snapshot = {
            let mut state = self.lock();
            f(&mut state);
            state.clone()
        };
        self.notify(&snapshot);
    }

    fn notify(&self, state: &PipelineState) {
        if let Some(observer) = &self.observer {
            observer.on_state_change(state);
        }
    }
}

/// Maps one page's recognition fraction onto the session's overall progress.
struct PageProgress<'a> {
    session: &'a OcrSession,
    page_num: usize,
    total: usize,
}

impl RecognitionProgress for PageProgress<'_> {
    fn on_progress(&self, fraction: f32) {
        let percent = overall_percent(self.page_num, self.total, fraction);
        if self.session.lock().progress >= percent {
            return;
        }
        self.session.update(|s| s.progress = s.progress.max(percent));
    }
}
