//! Filesystem storage.
//!
//! This module provides the storage layer of the receiver:
//!
//! - [`SheetStore`] - the date-partitioned store of accepted sheets
//! - [`FailedMailArchive`] - raw messages kept until they are processed

mod archive;
mod sheet_store;

pub use archive::FailedMailArchive;
pub use sheet_store::{render_index, SheetStore};

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StorageError {
    fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Returns true if `path` exists and is a directory.
pub(crate) async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// Creates `dir` and its parents if missing. Returns true if it was created.
pub(crate) async fn ensure_dir(dir: &Path) -> Result<bool> {
    if is_dir(dir).await {
        return Ok(false);
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| StorageError::io(dir, source))?;
    tracing::info!(dir = %dir.display(), "Created directory");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_dir_reports_creation() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        assert!(ensure_dir(&nested).await.unwrap());
        assert!(!ensure_dir(&nested).await.unwrap());
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn a_file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, "x").unwrap();

        assert!(is_dir(dir.path()).await);
        assert!(!is_dir(&file).await);
        assert!(!is_dir(&dir.path().join("missing")).await);
    }
}
