//! Resource directory lookups.
//!
//! Each reporting period has its own resource list at
//! `<template_dir>/<period>/resources.yml`, a YAML sequence of
//! `[id, name, email]` triples. Lists are loaded on first use and cached for
//! the lifetime of the directory, which is one receiver invocation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::{ReportingPeriod, ResourceId, ResourceRecord};
use crate::error::{ReceiverError, Result};

/// File name of the per-period resource list.
pub const RESOURCE_FILE_NAME: &str = "resources.yml";

/// Cached view of the per-period resource lists.
#[derive(Debug, Clone)]
pub struct ResourceDirectory {
    template_dir: PathBuf,
    cache: HashMap<ReportingPeriod, Vec<ResourceRecord>>,
}

impl ResourceDirectory {
    /// Creates a directory reading lists below `template_dir`.
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
            cache: HashMap::new(),
        }
    }

    /// Path of the resource list for `period`.
    pub fn list_path(&self, period: &ReportingPeriod) -> PathBuf {
        self.template_dir.join(period.as_str()).join(RESOURCE_FILE_NAME)
    }

    /// Returns the resource list for `period`, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::Infrastructure`] if the list is missing or
    /// malformed.
    pub async fn records(&mut self, period: &ReportingPeriod) -> Result<&[ResourceRecord]> {
        if !self.cache.contains_key(period) {
            let records = load_list(&self.list_path(period)).await?;
            self.cache.insert(period.clone(), records);
        }
        Ok(self
            .cache
            .get(period)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// Looks up a resource by id.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::UnknownResource`] if the id is not listed for
    /// the period.
    pub async fn resolve(
        &mut self,
        period: &ReportingPeriod,
        id: &ResourceId,
    ) -> Result<ResourceRecord> {
        self.records(period)
            .await?
            .iter()
            .find(|record| &record.id == id)
            .cloned()
            .ok_or_else(|| ReceiverError::UnknownResource(id.clone()))
    }

    /// Email address on file for a resource.
    pub async fn resolve_email(&mut self, period: &ReportingPeriod, id: &ResourceId) -> Result<String> {
        Ok(self.resolve(period, id).await?.email)
    }

    /// Display name on file for a resource.
    pub async fn resolve_name(&mut self, period: &ReportingPeriod, id: &ResourceId) -> Result<String> {
        Ok(self.resolve(period, id).await?.name)
    }
}

async fn load_list(path: &Path) -> Result<Vec<ResourceRecord>> {
    let context = format!("Cannot read resource file {}", path.display());
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ReceiverError::infrastructure(&context, e))?;
    let records: Vec<ResourceRecord> =
        serde_yaml::from_str(&content).map_err(|e| ReceiverError::infrastructure(&context, e))?;

    tracing::info!(path = %path.display(), count = records.len(), "Resources loaded");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RESOURCES: &str = "\
- [alice, Alice A., alice@example.com]
- - bob
  - Bob B.
  - bob@example.com
";

    fn directory_with(content: &str) -> (tempfile::TempDir, ResourceDirectory) {
        let dir = tempfile::tempdir().unwrap();
        let period_dir = dir.path().join("2024-03-01");
        std::fs::create_dir(&period_dir).unwrap();
        std::fs::write(period_dir.join(RESOURCE_FILE_NAME), content).unwrap();
        let directory = ResourceDirectory::new(dir.path());
        (dir, directory)
    }

    fn period() -> ReportingPeriod {
        ReportingPeriod::from("2024-03-01")
    }

    #[tokio::test]
    async fn resolves_name_and_email() {
        let (_dir, mut directory) = directory_with(RESOURCES);

        let email = directory
            .resolve_email(&period(), &ResourceId::from("bob"))
            .await
            .unwrap();
        let name = directory
            .resolve_name(&period(), &ResourceId::from("alice"))
            .await
            .unwrap();

        assert_eq!(email, "bob@example.com");
        assert_eq!(name, "Alice A.");
    }

    #[tokio::test]
    async fn unknown_id_is_a_user_error() {
        let (_dir, mut directory) = directory_with(RESOURCES);

        let err = directory
            .resolve(&period(), &ResourceId::from("carol"))
            .await
            .unwrap_err();

        assert!(matches!(err, ReceiverError::UnknownResource(_)));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn list_is_cached_after_first_load() {
        let (dir, mut directory) = directory_with(RESOURCES);
        directory.records(&period()).await.unwrap();

        std::fs::remove_file(dir.path().join("2024-03-01").join(RESOURCE_FILE_NAME)).unwrap();

        let email = directory
            .resolve_email(&period(), &ResourceId::from("alice"))
            .await
            .unwrap();
        assert_eq!(email, "alice@example.com");
    }

    #[tokio::test]
    async fn missing_list_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut directory = ResourceDirectory::new(dir.path());

        let err = directory.records(&period()).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn malformed_list_is_fatal() {
        let (_dir, mut directory) = directory_with("- [alice, only-two]\n");

        let err = directory.records(&period()).await.unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().starts_with("Cannot read resource file"));
    }
}
