//! Optical character recognition via the tesseract CLI.
//!
//! One invocation per page image. A recognition failure aborts the whole
//! request rather than skipping the page: partial documents would silently
//! misrepresent the upload. Blank pages are not an error, they just
//! contribute no text.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::config::ExtractionConfig;
use crate::error::ExtractionError;

/// Run tesseract over a single image and return the recognized text.
///
/// `page` is only used for diagnostics; recognition order is the caller's
/// responsibility.
pub async fn recognize_image(
    image: &Path,
    page: usize,
    config: &ExtractionConfig,
) -> Result<String, ExtractionError> {
    let mut command = Command::new("tesseract");
    command
        .arg(image)
        .arg("stdout")
        .arg("-l")
        .arg(&config.ocr_language)
        .kill_on_drop(true);

    debug!(page, image = %image.display(), "Running OCR");

    let timeout = Duration::from_secs(config.ocr_timeout_secs);
    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| ExtractionError::OcrTimeout {
            page,
            secs: config.ocr_timeout_secs,
        })?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExtractionError::OcrMissing { source: e }
            } else {
                ExtractionError::Io(e)
            }
        })?;

    if !output.status.success() {
        return Err(ExtractionError::OcrFailed {
            page,
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Concatenate per-page OCR output in page order.
///
/// Pages whose text is empty or whitespace-only contribute nothing, and no
/// stray separators are left behind for them.
pub fn join_page_texts<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for page in pages {
        let trimmed = page.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push_str("\n\n");
        }
        joined.push_str(trimmed);
    }
    joined
}
