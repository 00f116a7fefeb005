//! Progress reporting for OCR recognition and client sessions.
//!
//! Two callback traits live here:
//!
//! * [`RecognitionProgress`] is passed explicitly into every
//!   [`crate::pipeline::ocr::OcrEngine::recognize`] call. Engines invoke it
//!   zero or more times before they return, with a fraction in `[0, 1]`
//!   that never decreases within one call.
//! * [`SessionObserver`] receives a snapshot of
//!   [`crate::session::PipelineState`] every time a client session changes
//!   it, so a front-end can redraw progress, status and errors.
//!
//! # Example
//!
//! ```rust
//! use pdf_ocr::progress::RecognitionProgress;
//! use std::sync::Mutex;
//!
//! let seen = Mutex::new(Vec::new());
//! let cb = |fraction: f32| seen.lock().unwrap().push(fraction);
//! cb.on_progress(0.5);
//! assert_eq!(*seen.lock().unwrap(), vec![0.5]);
//! ```

use crate::session::PipelineState;
use std::sync::Arc;
use tracing::debug;

/// Receives recognition progress while an OCR call is in flight.
///
/// Implementations must be `Send + Sync`; the reference is held across
/// `.await` points inside the engine.
pub trait RecognitionProgress: Send + Sync {
    /// `fraction` is in `[0, 1]` and non-decreasing within one call.
    fn on_progress(&self, fraction: f32);
}

impl<F> RecognitionProgress for F
where
    F: Fn(f32) + Send + Sync,
{
    fn on_progress(&self, fraction: f32) {
        self(fraction)
    }
}

/// Ignores all progress events.
pub struct NoopProgress;

impl RecognitionProgress for NoopProgress {
    fn on_progress(&self, _fraction: f32) {}
}

/// Writes progress events to the log at DEBUG level.
///
/// The server pipeline uses this: progress is observed for diagnostics only,
/// never returned to the HTTP caller.
pub struct LoggingProgress {
    label: String,
}

impl LoggingProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl RecognitionProgress for LoggingProgress {
    fn on_progress(&self, fraction: f32) {
        debug!(
            target: "pdf_ocr::ocr",
            label = %self.label,
            "recognizing text: {:.0}%",
            fraction * 100.0
        );
    }
}

/// Called by [`crate::session::OcrSession`] after every state change.
pub trait SessionObserver: Send + Sync {
    fn on_state_change(&self, state: &PipelineState);
}

/// Convenience alias for the observer stored in a session.
pub type StateObserver = Arc<dyn SessionObserver>;

/// Overall run percentage for page `page_num` (1-based) of `total` pages with
/// the page's recognition `fraction` done.
///
/// Capped at 99: only a successfully finalized run may report 100.
pub fn overall_percent(page_num: usize, total: usize, fraction: f32) -> u8 {
    if total == 0 {
        return 0;
    }
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let done = (page_num.saturating_sub(1) as f32 + fraction) / total as f32;
    ((done * 100.0).round() as u8).min(99)
}
