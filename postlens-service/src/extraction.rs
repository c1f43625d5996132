//! Text extraction pipeline.
//!
//! Uploaded documents are either PDFs or raster images. PDFs first get a
//! cheap direct text-layer read; when that yields too little text the pages
//! are rasterized with poppler and recognized with tesseract. Raster images
//! go straight to OCR. Temporary artifacts created along the way are removed
//! on every exit path.

pub mod direct;
pub mod ocr;
pub mod rasterize;
pub mod temp;

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ExtractionConfig;
use crate::error::ExtractionError;
use temp::TempTracker;

/// Minimum direct-extracted text length considered a real text layer.
/// Shorter output (scanned pages, garbled encodings) triggers the OCR path.
pub const MIN_DIRECT_TEXT_LEN: usize = 50;

/// Where the upload's bytes live when the pipeline starts.
#[derive(Debug)]
pub enum DocumentSource {
    /// In-memory payload from a multipart upload
    Bytes(Vec<u8>),
    /// Already on disk (e.g. spooled by the transport layer)
    Path(PathBuf),
}

/// One uploaded document, as handed over by the HTTP layer.
#[derive(Debug)]
pub struct DocumentInput {
    pub source: DocumentSource,
    pub content_type: String,
    pub original_filename: String,
}

impl DocumentInput {
    /// PDFs are detected by declared content type or filename extension;
    /// everything else is treated as a raster image.
    pub fn is_pdf(&self) -> bool {
        let declared_pdf = self
            .content_type
            .parse::<mime::Mime>()
            .is_ok_and(|m| m.type_() == mime::APPLICATION && m.subtype() == mime::PDF);
        if declared_pdf {
            return true;
        }
        Path::new(&self.original_filename)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }

    fn extension(&self) -> String {
        Path::new(&self.original_filename)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Which strategy produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    Direct,
    Ocr,
}

/// Outcome of one extraction request
#[derive(Debug)]
pub struct ExtractionResult {
    /// Extracted text, possibly empty
    pub text: String,
    /// Number of recognized page images when the OCR path ran, 0 otherwise
    pub page_count: usize,
    pub method: ExtractionMethod,
}

/// The extraction orchestrator. Stateless between requests; each call owns
/// its own temp tracker.
pub struct Extractor {
    config: ExtractionConfig,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract text from one document.
    ///
    /// Fails only on fatal rasterization/recognition errors; an unreadable
    /// document otherwise yields empty text. Temp artifacts are cleaned up
    /// before this returns, on both paths.
    pub async fn extract(
        &self,
        input: &DocumentInput,
    ) -> Result<ExtractionResult, ExtractionError> {
        let mut tracker = TempTracker::new();
        let result = self.run(input, &mut tracker).await;
        tracker.cleanup().await;
        result
    }

    async fn run(
        &self,
        input: &DocumentInput,
        tracker: &mut TempTracker,
    ) -> Result<ExtractionResult, ExtractionError> {
        if input.is_pdf() {
            self.extract_pdf(input, tracker).await
        } else {
            self.extract_image(input, tracker).await
        }
    }

    async fn extract_pdf(
        &self,
        input: &DocumentInput,
        tracker: &mut TempTracker,
    ) -> Result<ExtractionResult, ExtractionError> {
        let direct_text = match &input.source {
            DocumentSource::Bytes(bytes) => direct::extract_text_layer(bytes),
            DocumentSource::Path(path) => match tokio::fs::read(path).await {
                Ok(bytes) => direct::extract_text_layer(&bytes),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Reading PDF for direct extraction failed");
                    String::new()
                }
            },
        };

        if direct_text.len() >= MIN_DIRECT_TEXT_LEN {
            debug!(
                chars = direct_text.len(),
                "Direct text extraction sufficient"
            );
            return Ok(ExtractionResult {
                text: direct_text,
                page_count: 0,
                method: ExtractionMethod::Direct,
            });
        }

        info!(
            chars = direct_text.len(),
            filename = %input.original_filename,
            "Direct text insufficient, falling back to rasterize + OCR"
        );

        let request_id = Uuid::new_v4();

        // pdftoppm needs a path; materialize in-memory uploads first
        let pdf_path = match &input.source {
            DocumentSource::Path(path) => path.clone(),
            DocumentSource::Bytes(bytes) => {
                let path = std::env::temp_dir().join(format!("postlens_upload_{request_id}.pdf"));
                tokio::fs::write(&path, bytes)
                    .await
                    .map_err(ExtractionError::Io)?;
                tracker.track_file(&path);
                path
            }
        };

        let pages_dir = std::env::temp_dir().join(format!("postlens_pages_{request_id}"));
        tracker.track_dir(&pages_dir);

        let page_images = rasterize::rasterize_pdf(&pdf_path, &pages_dir, &self.config).await?;
        tracker.track_files(page_images.iter().cloned());

        let mut page_texts = Vec::with_capacity(page_images.len());
        for (index, image) in page_images.iter().enumerate() {
            let text = ocr::recognize_image(image, index + 1, &self.config).await?;
            page_texts.push(text);
        }

        Ok(ExtractionResult {
            text: ocr::join_page_texts(&page_texts),
            page_count: page_images.len(),
            method: ExtractionMethod::Ocr,
        })
    }

    async fn extract_image(
        &self,
        input: &DocumentInput,
        tracker: &mut TempTracker,
    ) -> Result<ExtractionResult, ExtractionError> {
        // tesseract reads from a file, so in-memory images are materialized
        let image_path = match &input.source {
            DocumentSource::Path(path) => path.clone(),
            DocumentSource::Bytes(bytes) => {
                let path = std::env::temp_dir().join(format!(
                    "postlens_image_{}.{}",
                    Uuid::new_v4(),
                    input.extension()
                ));
                tokio::fs::write(&path, bytes)
                    .await
                    .map_err(ExtractionError::Io)?;
                tracker.track_file(&path);
                path
            }
        };

        let text = ocr::recognize_image(&image_path, 1, &self.config).await?;

        Ok(ExtractionResult {
            text: text.trim().to_string(),
            page_count: 1,
            method: ExtractionMethod::Ocr,
        })
    }
}
