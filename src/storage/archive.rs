//! Failed-submission archive.
//!
//! Every raw message is written here before any candidate is examined and
//! removed only once a sheet from it has been filed. Whatever is left in the
//! directory needs manual reprocessing.

use std::path::PathBuf;

use super::{Result, StorageError};
use crate::domain::MessageId;

/// Directory of raw messages awaiting successful processing.
#[derive(Debug, Clone)]
pub struct FailedMailArchive {
    dir: PathBuf,
}

impl FailedMailArchive {
    /// Creates an archive rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path the message with `id` is archived under.
    pub fn path_for(&self, id: &MessageId) -> PathBuf {
        self.dir.join(id.file_name())
    }

    /// Stores the raw message, replacing an earlier copy with the same id.
    pub async fn store(&self, id: &MessageId, raw: &[u8]) -> Result<PathBuf> {
        super::ensure_dir(&self.dir).await?;

        let path = self.path_for(id);
        tokio::fs::write(&path, raw)
            .await
            .map_err(|source| StorageError::io(&path, source))?;

        tracing::debug!(path = %path.display(), "Archived incoming message");
        Ok(path)
    }

    /// Removes the archived copy of a message.
    pub async fn remove(&self, id: &MessageId) -> Result<()> {
        let path = self.path_for(id);
        tokio::fs::remove_file(&path)
            .await
            .map_err(|source| StorageError::io(&path, source))?;

        tracing::debug!(path = %path.display(), "Removed archived message");
        Ok(())
    }

    /// Returns true if a copy of the message is archived.
    pub async fn contains(&self, id: &MessageId) -> bool {
        tokio::fs::try_exists(self.path_for(id))
            .await
            .unwrap_or(false)
    }
}
