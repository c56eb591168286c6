//! Aggregate index regeneration.
//!
//! After a sheet is filed, the `all.tji` file of its period directory is
//! rebuilt from a fresh directory listing so downstream tooling can include
//! every sheet of the period with one statement.

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::ReportingPeriod;
use crate::providers::scm::VersionControl;
use crate::storage::{SheetStore, StorageError};

/// Rewrites per-period inclusion indexes.
#[derive(Clone)]
pub struct InclusionIndexer {
    store: SheetStore,
    scm: Arc<dyn VersionControl>,
}

impl InclusionIndexer {
    /// Creates an indexer for `store`.
    pub fn new(store: SheetStore, scm: Arc<dyn VersionControl>) -> Self {
        Self { store, scm }
    }

    /// Rewrites the index of `period` and records it with version control.
    ///
    /// Failures are returned for the caller to report; the sheet itself is
    /// already filed at this point.
    pub async fn regenerate(&self, period: &ReportingPeriod) -> Result<PathBuf, StorageError> {
        let (path, entries) = self.store.write_index(period).await?;
        tracing::debug!(path = %path.display(), entries, "Inclusion index rewritten");

        if let Err(e) = self
            .scm
            .add("Adding/updating summary include file.", &path)
            .await
        {
            tracing::warn!(error = %e, path = %path.display(), "SCM update failed");
        }
        Ok(path)
    }
}
