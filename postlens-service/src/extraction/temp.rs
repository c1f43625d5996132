//! Per-request temporary artifact tracking.
//!
//! Rasterization and buffer materialization leave files on disk. Every
//! artifact created while handling one upload is registered here and removed
//! when the request finishes, on success and failure alike. Removal is
//! best-effort: a file that is already gone must never turn a successful
//! extraction into an error.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Tracks temp files and directories created during one extraction request.
///
/// Owned by the extractor for the duration of a single request; never shared.
#[derive(Debug, Default)]
pub struct TempTracker {
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

impl TempTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_file(&mut self, path: impl Into<PathBuf>) {
        self.files.push(path.into());
    }

    pub fn track_files<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for path in paths {
            self.track_file(path);
        }
    }

    pub fn track_dir(&mut self, path: impl Into<PathBuf>) {
        self.dirs.push(path.into());
    }

    /// Remove every tracked artifact: files first, then directories.
    ///
    /// Individual removal failures are logged and swallowed. Draining the
    /// lists makes a second call a no-op.
    pub async fn cleanup(&mut self) {
        for file in self.files.drain(..) {
            remove_file_quiet(&file).await;
        }
        for dir in self.dirs.drain(..) {
            if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                debug!(path = %dir.display(), error = %e, "Temp dir removal failed");
            }
        }
    }
}

async fn remove_file_quiet(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        debug!(path = %path.display(), error = %e, "Temp file removal failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cleanup_removes_files_and_dirs() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("upload.pdf");
        let dir = root.path().join("pages");
        let page = dir.join("page-1.png");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(&file, b"pdf").unwrap();
        std::fs::write(&page, b"png").unwrap();

        let mut tracker = TempTracker::new();
        tracker.track_file(&file);
        tracker.track_file(&page);
        tracker.track_dir(&dir);
        tracker.cleanup().await;

        assert!(!file.exists());
        assert!(!page.exists());
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_missing_artifacts() {
        let root = tempfile::tempdir().unwrap();
        let mut tracker = TempTracker::new();
        tracker.track_file(root.path().join("never-created.pdf"));
        tracker.track_dir(root.path().join("never-created-dir"));

        // Must not panic or error
        tracker.cleanup().await;
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("once.pdf");
        std::fs::write(&file, b"x").unwrap();

        let mut tracker = TempTracker::new();
        tracker.track_file(&file);
        tracker.cleanup().await;
        tracker.cleanup().await;

        assert!(!file.exists());
    }
}
