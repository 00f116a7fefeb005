//! [`PdfBackend`] implemented on PDFium via `pdfium-render`.
//!
//! ## Explicit binding
//!
//! The PDFium library location is resolved and checked once by
//! [`PdfiumBackend::bind`] at application start-up, and the resulting
//! backend is passed to every pipeline. Nothing is configured through
//! process-wide state.
//!
//! ## Why spawn_blocking?
//!
//! PDFium is a C++ library with internal locking (the `thread_safe` feature
//! of `pdfium-render` serialises calls). Every call is CPU-bound and may
//! block, so each operation runs on Tokio's blocking pool and the async
//! worker threads never stall on it. A `Pdfium` handle is not `Send`, so
//! each blocking task binds its own from the stored library location.

use crate::error::PdfOcrError;
use crate::output::OutputDocument;
use crate::pipeline::input::SourceDocument;
use crate::pipeline::render::{join_page_texts, PageImage, PageSize, PdfBackend};
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the directory holding the PDFium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// PDFium-backed implementation of [`PdfBackend`].
#[derive(Debug, Clone)]
pub struct PdfiumBackend {
    /// Library file to bind; `None` binds the system library.
    library: Option<PathBuf>,
}

impl PdfiumBackend {
    /// Bind to the PDFium library.
    ///
    /// `library_dir` may be the directory containing `libpdfium` or the
    /// library file itself. With `None` the system library search path is
    /// used. The library is loaded once here so a missing or broken
    /// installation fails at start-up rather than on the first document.
    pub fn bind(library_dir: Option<&Path>) -> Result<Self, PdfOcrError> {
        let library = library_dir.map(|path| {
            if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(path)
            } else {
                path.to_path_buf()
            }
        });
        let backend = Self { library };
        backend.bindings()?;

        match &backend.library {
            Some(lib) => info!("Bound PDFium from {}", lib.display()),
            None => info!("Bound system PDFium library"),
        }
        Ok(backend)
    }

    /// Bind using [`PDFIUM_LIB_PATH_ENV`] when set, the system library
    /// otherwise.
    pub fn bind_from_env() -> Result<Self, PdfOcrError> {
        match std::env::var_os(PDFIUM_LIB_PATH_ENV) {
            Some(dir) if !dir.is_empty() => Self::bind(Some(Path::new(&dir))),
            _ => Self::bind(None),
        }
    }

    /// The library file in use, `None` for the system library.
    pub fn library(&self) -> Option<&Path> {
        self.library.as_deref()
    }

    fn bindings(&self) -> Result<Box<dyn PdfiumLibraryBindings>, PdfOcrError> {
        match &self.library {
            Some(lib) => Pdfium::bind_to_library(lib),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| PdfOcrError::PdfiumBindingFailed(format!("{e:?}")))
    }

    /// Run `f` on the blocking pool with a freshly bound PDFium handle.
    async fn blocking<T, F>(&self, what: &'static str, f: F) -> Result<T, PdfOcrError>
    where
        T: Send + 'static,
        F: FnOnce(&Pdfium) -> Result<T, PdfOcrError> + Send + 'static,
    {
        let backend = self.clone();
        tokio::task::spawn_blocking(move || {
            let pdfium = Pdfium::new(backend.bindings()?);
            f(&pdfium)
        })
        .await
        .map_err(|e| PdfOcrError::Internal(format!("{what} task panicked: {e}")))?
    }
}

/// Load a document from memory, classifying load failures.
fn load<'a>(pdfium: &'a Pdfium, name: &str, bytes: &'a [u8]) -> Result<PdfDocument<'a>, PdfOcrError> {
    pdfium.load_pdf_from_byte_slice(bytes, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            PdfOcrError::PasswordRequired {
                name: name.to_string(),
            }
        } else {
            PdfOcrError::CorruptPdf {
                name: name.to_string(),
                detail: err_str,
            }
        }
    })
}

#[async_trait]
impl PdfBackend for PdfiumBackend {
    async fn page_sizes(&self, source: &SourceDocument) -> Result<Vec<PageSize>, PdfOcrError> {
        let name = source.name().to_string();
        let bytes = source.shared_bytes();

        self.blocking("page size", move |pdfium| {
            let document = load(pdfium, &name, &bytes)?;
            let sizes: Vec<PageSize> = document
                .pages()
                .iter()
                .map(|page| PageSize::new(page.width().value, page.height().value))
                .collect();
            info!("PDF loaded: {} pages", sizes.len());
            Ok(sizes)
        })
        .await
    }

    async fn rasterize(
        &self,
        source: &SourceDocument,
        page_index: usize,
        scale: f32,
    ) -> Result<PageImage, PdfOcrError> {
        let name = source.name().to_string();
        let bytes = source.shared_bytes();

        self.blocking("render", move |pdfium| {
            let document = load(pdfium, &name, &bytes)?;
            let pages = document.pages();
            let total = pages.len() as usize;
            if page_index >= total {
                return Err(PdfOcrError::PageOutOfRange {
                    page: page_index + 1,
                    total,
                });
            }

            let page = pages
                .get(page_index as u16)
                .map_err(|e| PdfOcrError::RasterisationFailed {
                    page: page_index + 1,
                    detail: format!("{:?}", e),
                })?;

            let viewport = PageSize::new(page.width().value, page.height().value).scaled(scale);
            let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                PdfOcrError::RasterisationFailed {
                    page: page_index + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                page_index + 1,
                image.width(),
                image.height()
            );

            Ok(PageImage {
                page_num: page_index + 1,
                viewport,
                image,
            })
        })
        .await
    }

    async fn extract_text(&self, source: &SourceDocument) -> Result<String, PdfOcrError> {
        let name = source.name().to_string();
        let bytes = source.shared_bytes();

        self.blocking("text extraction", move |pdfium| {
            let document = load(pdfium, &name, &bytes)?;
            let mut texts = Vec::new();
            for (idx, page) in document.pages().iter().enumerate() {
                let text = page.text().map_err(|e| {
                    PdfOcrError::TextExtractionFailed(format!("page {}: {:?}", idx + 1, e))
                })?;
                texts.push(text.all());
            }
            let joined = join_page_texts(texts);
            debug!("Extracted {} chars of embedded text", joined.len());
            Ok(joined)
        })
        .await
    }

    async fn write(&self, document: &OutputDocument) -> Result<Vec<u8>, PdfOcrError> {
        let output = document.clone();

        self.blocking("assembly", move |pdfium| {
            let assembly = |e: PdfiumError| PdfOcrError::AssemblyFailed(format!("{:?}", e));

            let mut pdf = pdfium.create_new_pdf().map_err(assembly)?;
            let font = pdf.fonts_mut().helvetica();

            for out_page in output.pages() {
                let mut page = pdf
                    .pages_mut()
                    .create_page_at_end(PdfPagePaperSize::Custom(
                        PdfPoints::new(out_page.width),
                        PdfPoints::new(out_page.height),
                    ))
                    .map_err(assembly)?;

                for block in &out_page.blocks {
                    for (y, line) in block.lines() {
                        page.objects_mut()
                            .create_text_object(
                                PdfPoints::new(block.x),
                                PdfPoints::new(y),
                                line,
                                font,
                                PdfPoints::new(block.font_size),
                            )
                            .map_err(assembly)?;
                    }
                }
            }

            let bytes = pdf.save_to_bytes().map_err(assembly)?;
            debug!(
                "Assembled output PDF: {} pages, {} bytes",
                output.page_count(),
                bytes.len()
            );
            Ok(bytes)
        })
        .await
    }
}
