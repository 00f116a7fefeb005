//! Text recognition.
//!
//! [`OcrEngine`] is the OCR seam. [`TesseractEngine`] drives the `tesseract`
//! command-line tool: the input is written to a private temporary directory,
//! `tesseract <input> stdout -l <lang>` is run as a child process, and its
//! standard output is the recognized text.

use crate::error::PdfOcrError;
use crate::progress::RecognitionProgress;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, instrument};

/// What to recognise.
#[derive(Debug, Clone, Copy)]
pub enum OcrInput<'a> {
    /// A rendered page.
    Bitmap(&'a DynamicImage),
    /// Raw bytes of an image-like file, handed to the engine as-is.
    Encoded(&'a [u8]),
}

/// An OCR engine.
///
/// `recognize` returns the full recognized text or an error; it never
/// returns partial text. While it runs it may call `progress` zero or more
/// times with a non-decreasing fraction in `[0, 1]`.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(
        &self,
        input: OcrInput<'_>,
        language: &str,
        progress: &dyn RecognitionProgress,
    ) -> Result<String, PdfOcrError>;
}

/// Settings for [`TesseractEngine`].
#[derive(Debug, Clone, Default)]
pub struct TesseractSettings {
    /// Path to the `tesseract` binary. Default: `tesseract` on `PATH`.
    pub binary: Option<PathBuf>,
    /// Directory with `*.traineddata`, exported as `TESSDATA_PREFIX`.
    pub tessdata_dir: Option<PathBuf>,
}

/// OCR engine wrapping the `tesseract` CLI tool.
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    settings: TesseractSettings,
}

impl TesseractEngine {
    pub fn new(settings: TesseractSettings) -> Self {
        Self { settings }
    }

    fn binary(&self) -> &Path {
        self.settings
            .binary
            .as_deref()
            .unwrap_or_else(|| Path::new("tesseract"))
    }

    /// Run `tesseract --version`; fails when the binary cannot be started.
    pub async fn version(&self) -> Result<String, PdfOcrError> {
        let output = Command::new(self.binary())
            .arg("--version")
            .output()
            .await
            .map_err(|e| self.unavailable(e))?;
        let text = String::from_utf8_lossy(&output.stdout);
        let text = if text.trim().is_empty() {
            String::from_utf8_lossy(&output.stderr)
        } else {
            text
        };
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }

    fn unavailable(&self, e: std::io::Error) -> PdfOcrError {
        PdfOcrError::OcrEngineUnavailable {
            binary: self.binary().display().to_string(),
            reason: e.to_string(),
        }
    }

    /// Write `input` into `dir` and return the path tesseract should read.
    fn write_input(dir: &Path, input: OcrInput<'_>) -> Result<PathBuf, PdfOcrError> {
        match input {
            OcrInput::Bitmap(image) => {
                let path = dir.join("input.png");
                image
                    .save_with_format(&path, image::ImageFormat::Png)
                    .map_err(|e| PdfOcrError::OcrFailed(format!("cannot write page image: {e}")))?;
                Ok(path)
            }
            OcrInput::Encoded(bytes) => {
                let path = dir.join(format!("input.{}", sniff_extension(bytes)));
                std::fs::write(&path, bytes)
                    .map_err(|e| PdfOcrError::OcrFailed(format!("cannot write OCR input: {e}")))?;
                Ok(path)
            }
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    #[instrument(level = "debug", skip_all, fields(language = %language))]
    async fn recognize(
        &self,
        input: OcrInput<'_>,
        language: &str,
        progress: &dyn RecognitionProgress,
    ) -> Result<String, PdfOcrError> {
        let tmpdir = tempfile::TempDir::with_prefix("pdf-ocr")
            .map_err(|e| PdfOcrError::Internal(format!("tempdir: {e}")))?;
        let input_path = Self::write_input(tmpdir.path(), input)?;

        progress.on_progress(0.0);

        let mut cmd = Command::new(self.binary());
        cmd.args(tesseract_args(&input_path, language));
        if let Some(dir) = &self.settings.tessdata_dir {
            cmd.env("TESSDATA_PREFIX", dir);
        }
        debug!("Running {} on {}", self.binary().display(), input_path.display());

        let output = cmd.output().await.map_err(|e| self.unavailable(e))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PdfOcrError::OcrFailed(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = clean_ocr_text(&String::from_utf8_lossy(&output.stdout));
        progress.on_progress(1.0);
        debug!("Recognized {} chars", text.len());
        Ok(text)
    }
}

/// Command-line arguments for one recognition.
fn tesseract_args(input: &Path, language: &str) -> Vec<String> {
    vec![
        input.display().to_string(),
        "stdout".to_string(),
        "-l".to_string(),
        language.to_string(),
    ]
}

/// File extension tesseract should see for `bytes`, from their magic bytes.
fn sniff_extension(bytes: &[u8]) -> &'static str {
    infer::get(bytes).map(|kind| kind.extension()).unwrap_or("bin")
}

/// Strip the form feed tesseract appends after every page, and trailing
/// whitespace.
pub fn clean_ocr_text(raw: &str) -> String {
    raw.replace('\u{000C}', "").trim_end().to_string()
}
