//! CLI binary for pdf-ocr.
//!
//! A thin shim over the library crate: `convert` drives an [`OcrSession`]
//! over a local file, `serve` starts the HTTP service.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_ocr::{
    write_output, OcrConfig, OcrSession, PdfiumBackend, PipelineState,
    SessionObserver, SourceDocument, Stage, TesseractEngine, TesseractSettings,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress observer using indicatif ────────────────────────────────────

/// Renders session progress as a 0–100 bar with the status line as message.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("OCR");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl SessionObserver for CliObserver {
    fn on_state_change(&self, state: &PipelineState) {
        self.bar.set_position(u64::from(state.progress));
        if !state.status.is_empty() {
            self.bar.set_message(state.status.clone());
        }
        match state.stage {
            Stage::Complete | Stage::Error => self.bar.finish_and_clear(),
            _ => {}
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # OCR a scan, writing scan_ocr.pdf next to it
  pdf-ocr convert scan.pdf

  # Choose the output path and print the recognised text
  pdf-ocr convert scan.pdf -o out/searchable.pdf --text

  # German text, higher render scale
  pdf-ocr --lang deu --scale 4 convert brief.pdf

  # Start the upload service on all interfaces
  pdf-ocr serve --host 0.0.0.0 --port 3000

  # Upload a file
  curl -F "file=@scan.pdf" -o ocr-result.pdf http://localhost:3000/api/ocr

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Directory (or file) of the PDFium shared library
  PDF_OCR_TESSERACT       Path to the tesseract binary
  PDF_OCR_TESSDATA        Directory with *.traineddata files
  PDF_OCR_LANG            OCR language (default: eng)
  RUST_LOG                Overrides the log filter

SETUP:
  PDFium and Tesseract must be installed. Without --pdfium-lib the system
  library search path is used.
"#;

/// Make scanned PDFs searchable with Tesseract OCR.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-ocr",
    version,
    about = "Make scanned PDFs searchable with Tesseract OCR",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    engines: EngineArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF_OCR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF_OCR_QUIET")]
    quiet: bool,
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Directory or file of the PDFium shared library.
    #[arg(long, global = true, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Path to the tesseract binary.
    #[arg(long, global = true, env = "PDF_OCR_TESSERACT")]
    tesseract: Option<PathBuf>,

    /// Directory with *.traineddata files.
    #[arg(long, global = true, env = "PDF_OCR_TESSDATA")]
    tessdata: Option<PathBuf>,

    /// OCR language, e.g. eng, deu, eng+fra.
    #[arg(long, global = true, env = "PDF_OCR_LANG", default_value = "eng")]
    lang: String,

    /// Page render scale (0–10].
    #[arg(long, global = true, env = "PDF_OCR_SCALE", default_value_t = 3.0)]
    scale: f32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// OCR a local PDF page by page.
    Convert {
        /// The PDF to process.
        input: PathBuf,

        /// Output path. Default: <input>_ocr.pdf next to the input.
        #[arg(short, long, env = "PDF_OCR_OUTPUT")]
        output: Option<PathBuf>,

        /// Also print the recognised text to stdout.
        #[arg(long)]
        text: bool,
    },
    /// Serve the upload form and OCR API.
    Serve {
        #[arg(long, env = "PDF_OCR_HOST", default_value = "127.0.0.1")]
        host: String,

        #[arg(long, env = "PDF_OCR_PORT", default_value_t = 3000)]
        port: u16,

        /// Request body limit in MB.
        #[arg(long, env = "PDF_OCR_MAX_UPLOAD_MB", default_value_t = 100)]
        max_upload_mb: usize,

        /// Answer failures with 400/500 instead of 200.
        #[arg(long, env = "PDF_OCR_STRICT_STATUS")]
        strict_status: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs during `convert`.
    let show_progress = !cli.quiet && matches!(cli.command, Command::Convert { .. });
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Engines ──────────────────────────────────────────────────────────
    let backend = PdfiumBackend::bind(cli.engines.pdfium_lib.as_deref())
        .context("Failed to load the PDFium library (set --pdfium-lib or PDFIUM_LIB_PATH)")?;

    let ocr = TesseractEngine::new(TesseractSettings {
        binary: cli.engines.tesseract.clone(),
        tessdata_dir: cli.engines.tessdata.clone(),
    });
    let version = ocr
        .version()
        .await
        .context("Tesseract is not available (set --tesseract or PDF_OCR_TESSERACT)")?;
    tracing::info!("Using {}", version);

    let config = OcrConfig::builder()
        .render_scale(cli.engines.scale)
        .language(cli.engines.lang.clone())
        .build()
        .context("Invalid configuration")?;

    match cli.command {
        Command::Convert {
            input,
            output,
            text,
        } => {
            run_convert(
                Arc::new(backend),
                Arc::new(ocr),
                config,
                &input,
                output,
                text,
                cli.quiet,
                show_progress,
            )
            .await
        }
        Command::Serve {
            host,
            port,
            max_upload_mb,
            strict_status,
        } => {
            run_serve(
                Arc::new(backend),
                Arc::new(ocr),
                config,
                host,
                port,
                max_upload_mb,
                strict_status,
            )
            .await
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_convert(
    backend: Arc<PdfiumBackend>,
    ocr: Arc<TesseractEngine>,
    config: OcrConfig,
    input: &Path,
    output: Option<PathBuf>,
    print_text: bool,
    quiet: bool,
    show_progress: bool,
) -> Result<()> {
    let start = Instant::now();
    let source = SourceDocument::from_path(input)
        .await
        .with_context(|| format!("Cannot use {} as input", input.display()))?;

    let mut session = OcrSession::new(backend, ocr, config);
    if show_progress {
        session = session.with_observer(CliObserver::new());
    }
    session.select_file(Some(source));

    let Some(result) = session.submit().await else {
        let message = session.state().error.unwrap_or_default();
        if !quiet {
            eprintln!("{} {}", red("✘"), message);
        }
        anyhow::bail!("{message}");
    };

    let output_path = output.unwrap_or_else(|| default_output_path(input, &result.filename));
    write_output(&output_path, &result.pdf)
        .await
        .context("Failed to write output")?;

    if print_text {
        println!("{}", result.text);
    }
    if !quiet {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            result.page_count,
            start.elapsed().as_millis(),
            bold(&output_path.display().to_string()),
        );
    }
    Ok(())
}

/// `scan.pdf` → `scan_ocr.pdf` in the same directory.
fn default_output_path(input: &Path, filename: &str) -> PathBuf {
    match input.parent() {
        Some(dir) => dir.join(filename),
        None => PathBuf::from(filename),
    }
}

#[cfg(feature = "server")]
async fn run_serve(
    backend: Arc<PdfiumBackend>,
    ocr: Arc<TesseractEngine>,
    config: OcrConfig,
    host: String,
    port: u16,
    max_upload_mb: usize,
    strict_status: bool,
) -> Result<()> {
    use pdf_ocr::api::{serve, ApiState, ServerConfig};

    let server = ServerConfig {
        host,
        port,
        max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
        strict_status,
    };
    let state = ApiState {
        backend,
        ocr,
        config: Arc::new(config),
    };
    serve(state, &server).await.context("Server failed")
}

#[cfg(not(feature = "server"))]
async fn run_serve(
    _backend: Arc<PdfiumBackend>,
    _ocr: Arc<TesseractEngine>,
    _config: OcrConfig,
    _host: String,
    _port: u16,
    _max_upload_mb: usize,
    _strict_status: bool,
) -> Result<()> {
    anyhow::bail!("this build of pdf-ocr was compiled without the `server` feature")
}
