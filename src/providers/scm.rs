//! Version-control collaborator.
//!
//! The filer reports every directory and file it creates or updates through
//! [`VersionControl`]. The concrete backend is a shell command template
//! configured by the operator (for example `git add %f && git commit -m '%m' %f`).

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// Errors reported by a version-control backend.
#[derive(Debug, Error)]
pub enum ScmError {
    /// The command could not be started.
    #[error("cannot run SCM command '{command}': {source}")]
    Spawn {
        /// Expanded command line.
        command: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The command ran but exited unsuccessfully.
    #[error("SCM command '{command}' failed with {status}")]
    Failed {
        /// Expanded command line.
        command: String,
        /// Exit status description.
        status: String,
    },
}

/// Records stored files with a version-control system.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Records that `path` was added or updated, with a change message.
    async fn add(&self, message: &str, path: &Path) -> Result<(), ScmError>;
}

/// Backend used when no SCM command is configured.
#[derive(Debug, Clone, Default)]
pub struct NoVersionControl;

#[async_trait]
impl VersionControl for NoVersionControl {
    async fn add(&self, message: &str, path: &Path) -> Result<(), ScmError> {
        tracing::debug!(path = %path.display(), change = message, "No SCM configured");
        Ok(())
    }
}

/// Runs a shell command template for every change.
///
/// `%m` is replaced by the change message and `%f` by the file path.
#[derive(Debug, Clone)]
pub struct ScmCommand {
    template: String,
    dry_run: bool,
}

impl ScmCommand {
    /// Creates a backend from a command template.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            dry_run: false,
        }
    }

    /// Only logs the expanded command instead of running it.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Expands the template for one change.
    pub fn expand(&self, message: &str, path: &Path) -> String {
        self.template
            .replace("%m", message)
            .replace("%f", &path.display().to_string())
    }
}

#[async_trait]
impl VersionControl for ScmCommand {
    async fn add(&self, message: &str, path: &Path) -> Result<(), ScmError> {
        let command = self.expand(message, path);
        if self.dry_run {
            tracing::info!(%command, "Dry run: SCM command skipped");
            return Ok(());
        }

        let status = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .status()
            .await
            .map_err(|source| ScmError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ScmError::Failed {
                command,
                status: status.to_string(),
            });
        }

        tracing::debug!(%command, "SCM command succeeded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_message_and_path() {
        let scm = ScmCommand::new("git commit -m '%m' %f");
        let command = scm.expand("Adding new directory", Path::new("sheets/2024-03-01"));
        assert_eq!(command, "git commit -m 'Adding new directory' sheets/2024-03-01");
    }

    #[tokio::test]
    async fn runs_the_expanded_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let scm = ScmCommand::new("echo '%m' > %f");

        scm.add("recorded", &marker).await.unwrap();

        let content = std::fs::read_to_string(&marker).unwrap();
        assert_eq!(content.trim(), "recorded");
    }

    #[tokio::test]
    async fn reports_failing_command() {
        let scm = ScmCommand::new("exit 3");
        let result = scm.add("msg", Path::new("file")).await;
        assert!(matches!(result, Err(ScmError::Failed { .. })));
    }

    #[tokio::test]
    async fn dry_run_does_not_execute() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let scm = ScmCommand::new("touch %f").dry_run(true);

        scm.add("msg", &marker).await.unwrap();
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn no_version_control_accepts_everything() {
        let scm = NoVersionControl;
        assert!(scm.add("msg", Path::new("file")).await.is_ok());
    }
}
