//! Guaranteed temp-artifact cleanup
//!
//! Every temp path the pipeline creates is registered here at creation
//! time, before any write happens. Cleanup then runs on every exit path
//! and can never mask the pipeline's primary result.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Registry of temp paths owned by one pipeline invocation.
///
/// Shared across the concurrent synthesis units of a single request; a
/// sibling that finishes after the batch has already failed still gets its
/// artifact registered and removed.
#[derive(Debug, Default)]
pub struct TempArtifacts {
    paths: Mutex<Vec<PathBuf>>,
}

impl TempArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path for end-of-pipeline removal
    pub fn register(&self, path: impl Into<PathBuf>) {
        self.paths.lock().push(path.into());
    }

    /// Snapshot of the registered paths
    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().clone()
    }

    fn drain(&self) -> Vec<PathBuf> {
        std::mem::take(&mut *self.paths.lock())
    }
}

/// Best-effort removal of registered temp artifacts
#[derive(Debug, Default)]
pub struct CleanupManager;

impl CleanupManager {
    pub fn new() -> Self {
        Self
    }

    /// Delete every registered artifact.
    ///
    /// Individual failures are logged and swallowed; a file that is
    /// already gone is not a failure. Draining the registry makes a second
    /// invocation a no-op.
    pub async fn cleanup(&self, artifacts: &TempArtifacts) {
        for path in artifacts.drain() {
            self.remove(&path).await;
        }
    }

    async fn remove(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "deleted temp artifact");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not delete temp artifact");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cleanup_removes_registered_files() {
        let dir = tempfile::tempdir().unwrap();
        let file_a = dir.path().join("a.wav");
        let file_b = dir.path().join("b.wav");
        std::fs::write(&file_a, b"a").unwrap();
        std::fs::write(&file_b, b"b").unwrap();

        let artifacts = TempArtifacts::new();
        artifacts.register(&file_a);
        artifacts.register(&file_b);

        CleanupManager::new().cleanup(&artifacts).await;

        assert!(!file_a.exists());
        assert!(!file_b.exists());
        assert!(artifacts.paths().is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = TempArtifacts::new();
        artifacts.register(dir.path().join("never-created.wav"));

        // Must not panic or error
        CleanupManager::new().cleanup(&artifacts).await;
        assert!(artifacts.paths().is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("once.wav");
        std::fs::write(&file, b"x").unwrap();

        let artifacts = TempArtifacts::new();
        artifacts.register(&file);

        let manager = CleanupManager::new();
        manager.cleanup(&artifacts).await;
        manager.cleanup(&artifacts).await;

        assert!(!file.exists());
    }
}
