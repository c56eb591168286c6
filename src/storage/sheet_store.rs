//! Date-partitioned sheet store.
//!
//! Layout:
//!
//! ```text
//! <root>/<period>/<resource>_<period>.tji
//! <root>/<period>/all.tji          include list of the sibling sheets
//! ```
//!
//! Nothing here serializes access between receiver processes. Two
//! submissions for the same period can race between listing the directory
//! and rewriting `all.tji`; the next filing in that directory repairs the
//! index.

use std::path::PathBuf;

use super::{Result, StorageError};
use crate::domain::{FiledSheet, ReportingPeriod, ResourceId, INDEX_FILE_NAME, SHEET_EXTENSION};

/// Filesystem store for accepted sheets.
#[derive(Debug, Clone)]
pub struct SheetStore {
    root: PathBuf,
}

impl SheetStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding all sheets for `period`.
    pub fn period_dir(&self, period: &ReportingPeriod) -> PathBuf {
        self.root.join(period.as_str())
    }

    /// Path of the sheet for `resource_id` in `period`.
    pub fn sheet_path(&self, resource_id: &ResourceId, period: &ReportingPeriod) -> PathBuf {
        self.period_dir(period)
            .join(FiledSheet::file_name(resource_id, period))
    }

    /// Path of the aggregate index for `period`.
    pub fn index_path(&self, period: &ReportingPeriod) -> PathBuf {
        self.period_dir(period).join(INDEX_FILE_NAME)
    }

    /// Creates the store root if missing. Returns true if it was created.
    pub async fn ensure_root(&self) -> Result<bool> {
        super::ensure_dir(&self.root).await
    }

    /// Creates the period directory if missing. Returns true if it was created.
    ///
    /// A directory created concurrently by another process counts as
    /// already present.
    pub async fn ensure_period_dir(&self, period: &ReportingPeriod) -> Result<bool> {
        let dir = self.period_dir(period);
        if super::is_dir(&dir).await {
            return Ok(false);
        }

        match tokio::fs::create_dir(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(source) => Err(StorageError::io(&dir, source)),
        }
    }

    /// Writes a sheet, replacing any earlier submission for the same pair.
    pub async fn write_sheet(
        &self,
        resource_id: &ResourceId,
        period: &ReportingPeriod,
        text: &str,
    ) -> Result<PathBuf> {
        let path = self.sheet_path(resource_id, period);
        tokio::fs::write(&path, text)
            .await
            .map_err(|source| StorageError::io(&path, source))?;
        Ok(path)
    }

    /// Lists the sheet file names in a period directory, sorted by name.
    ///
    /// The index file itself is excluded.
    pub async fn list_sheets(&self, period: &ReportingPeriod) -> Result<Vec<String>> {
        let dir = self.period_dir(period);
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|source| StorageError::io(&dir, source))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| StorageError::io(&dir, source))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.ends_with(SHEET_EXTENSION) || name == INDEX_FILE_NAME {
                continue;
            }
            let is_file = entry
                .file_type()
                .await
                .map(|kind| kind.is_file())
                .unwrap_or(false);
            if is_file {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Rewrites the aggregate index of a period directory from scratch.
    ///
    /// Returns the index path and the number of entries written.
    pub async fn write_index(&self, period: &ReportingPeriod) -> Result<(PathBuf, usize)> {
        let names = self.list_sheets(period).await?;
        let path = self.index_path(period);
        tokio::fs::write(&path, render_index(&names))
            .await
            .map_err(|source| StorageError::io(&path, source))?;
        Ok((path, names.len()))
    }
}

/// Renders one include directive per sheet file name.
pub fn render_index(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("include '{}' {{ }}\n", name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn period() -> ReportingPeriod {
        ReportingPeriod::from("2024-03-01")
    }

    #[test]
    fn paths_follow_layout() {
        let store = SheetStore::new("/store");
        assert_eq!(
            store.sheet_path(&ResourceId::from("alice"), &period()),
            PathBuf::from("/store/2024-03-01/alice_2024-03-01.tji")
        );
        assert_eq!(
            store.index_path(&period()),
            PathBuf::from("/store/2024-03-01/all.tji")
        );
    }

    #[test]
    fn renders_include_lines() {
        let text = render_index(&["a.tji".to_string(), "b.tji".to_string()]);
        assert_eq!(text, "include 'a.tji' { }\ninclude 'b.tji' { }\n");
    }

    #[tokio::test]
    async fn period_dir_is_created_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = SheetStore::new(dir.path());

        assert!(store.ensure_period_dir(&period()).await.unwrap());
        assert!(!store.ensure_period_dir(&period()).await.unwrap());
    }

    #[tokio::test]
    async fn index_lists_sheets_but_not_itself() {
        let dir = tempfile::tempdir().unwrap();
        let store = SheetStore::new(dir.path());
        store.ensure_period_dir(&period()).await.unwrap();

        store
            .write_sheet(&ResourceId::from("bob"), &period(), "b")
            .await
            .unwrap();
        store
            .write_sheet(&ResourceId::from("alice"), &period(), "a")
            .await
            .unwrap();
        std::fs::write(store.period_dir(&period()).join("notes.txt"), "x").unwrap();

        let (path, count) = store.write_index(&period()).await.unwrap();
        assert_eq!(count, 2);

        // A second rewrite must not pick up the index file.
        let (_, count) = store.write_index(&period()).await.unwrap();
        assert_eq!(count, 2);

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            content,
            "include 'alice_2024-03-01.tji' { }\ninclude 'bob_2024-03-01.tji' { }\n"
        );
    }

    #[tokio::test]
    async fn write_sheet_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = SheetStore::new(dir.path());
        store.ensure_period_dir(&period()).await.unwrap();
        let id = ResourceId::from("alice");

        store.write_sheet(&id, &period(), "first").await.unwrap();
        let path = store.write_sheet(&id, &period(), "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "second");
        assert_eq!(store.list_sheets(&period()).await.unwrap().len(), 1);
    }
}
