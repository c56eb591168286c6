//! Filing of accepted sheets.

use std::sync::Arc;

use crate::domain::{CandidateSheet, FiledSheet, SheetHeader, SheetKind};
use crate::error::{ReceiverError, Result};
use crate::providers::scm::VersionControl;
use crate::storage::SheetStore;

/// Writes accepted sheets to the store and records them with version control.
#[derive(Clone)]
pub struct SheetFiler {
    kind: SheetKind,
    store: SheetStore,
    scm: Arc<dyn VersionControl>,
}

impl SheetFiler {
    /// Creates a filer for `store`.
    pub fn new(kind: SheetKind, store: SheetStore, scm: Arc<dyn VersionControl>) -> Self {
        Self { kind, store, scm }
    }

    /// Files a sheet under its reporting period.
    ///
    /// Resubmitting the same resource and period replaces the earlier file.
    ///
    /// # Errors
    ///
    /// Any I/O failure is reported as [`ReceiverError::Infrastructure`].
    pub async fn file(&self, sheet: &CandidateSheet, header: &SheetHeader) -> Result<FiledSheet> {
        let dir = self.store.period_dir(&header.period);
        let created = self.store.ensure_period_dir(&header.period).await.map_err(|e| {
            ReceiverError::infrastructure(format!("Cannot store {}", self.kind), e)
        })?;
        if created {
            tracing::info!(dir = %dir.display(), "Created period directory");
            self.record("Adding new directory", &dir).await;
        }

        let path = self
            .store
            .write_sheet(&header.resource_id, &header.period, &sheet.text)
            .await
            .map_err(|e| ReceiverError::infrastructure(format!("Cannot store {}", self.kind), e))?;
        self.record(&format!("Adding/updating {}", path.display()), &path)
            .await;

        tracing::info!(path = %path.display(), "Filed {}", self.kind);
        Ok(FiledSheet {
            resource_id: header.resource_id.clone(),
            period: header.period.clone(),
            path,
        })
    }

    async fn record(&self, message: &str, path: &std::path::Path) {
        if let Err(e) = self.scm.add(message, path).await {
            tracing::warn!(error = %e, path = %path.display(), "SCM update failed");
        }
    }
}
