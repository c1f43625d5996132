//! PDF page rasterization via pdftoppm (poppler-utils).
//!
//! OCR needs standalone raster images, so PDF pages are rendered to PNGs
//! with an external poppler invocation. Unlike the direct text-layer path
//! there is no further fallback behind this stage: a missing or failing
//! pdftoppm is fatal for the request.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::config::ExtractionConfig;
use crate::error::ExtractionError;

/// Render every page of the PDF at `pdf_path` into `out_dir` and return the
/// page image paths sorted lexicographically by filename.
///
/// pdftoppm numbers output files with zero-padded page indices, which keeps
/// the lexicographic order page-correct; callers must not re-sort.
pub async fn rasterize_pdf(
    pdf_path: &Path,
    out_dir: &Path,
    config: &ExtractionConfig,
) -> Result<Vec<PathBuf>, ExtractionError> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(ExtractionError::Io)?;

    let out_prefix = out_dir.join("page");
    let mut command = Command::new("pdftoppm");
    command
        .arg("-png")
        .arg("-r")
        .arg(config.rasterize_dpi.to_string())
        .arg(pdf_path)
        .arg(&out_prefix)
        .kill_on_drop(true);

    debug!(pdf = %pdf_path.display(), out = %out_dir.display(), "Rasterizing PDF pages");

    let timeout = Duration::from_secs(config.rasterize_timeout_secs);
    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| ExtractionError::RasterizerTimeout {
            secs: config.rasterize_timeout_secs,
        })?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExtractionError::RasterizerMissing { source: e }
            } else {
                ExtractionError::Io(e)
            }
        })?;

    if !output.status.success() {
        return Err(ExtractionError::RasterizerFailed {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    collect_page_images(out_dir).await
}

/// List the PNG files pdftoppm produced, sorted by filename.
async fn collect_page_images(out_dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let mut entries = tokio::fs::read_dir(out_dir)
        .await
        .map_err(ExtractionError::Io)?;

    let mut images = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(ExtractionError::Io)? {
        let path = entry.path();
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png {
            images.push(path);
        }
    }

    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_page_images_sorts_by_filename() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-03.png", "page-01.png", "page-02.png"] {
            std::fs::write(dir.path().join(name), b"png").unwrap();
        }
        // Non-image noise must be ignored
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let images = collect_page_images(dir.path()).await.unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["page-01.png", "page-02.png", "page-03.png"]);
    }

    #[tokio::test]
    async fn test_collect_page_images_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let images = collect_page_images(dir.path()).await.unwrap();
        assert!(images.is_empty());
    }
}
