//! Receiver settings and configuration types.
//!
//! Settings are read from a JSON file (by default
//! `~/.config/sheet-receiver/receiver.json` or the XDG equivalent) once at
//! startup. Unset directory fields fall back to the layout conventional for
//! the configured [`SheetKind`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::SheetKind;

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for [`ReceiverConfig`].
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        /// Path that was read.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
}

/// Top-level receiver settings.
///
/// Constructed once at startup and passed by reference to every component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Kind of sheet this receiver accepts.
    pub kind: SheetKind,
    /// Working directory relative paths are resolved against.
    pub base_dir: PathBuf,
    /// Root of the date-partitioned sheet store.
    pub sheet_dir: Option<PathBuf>,
    /// Directory holding per-period templates and resource lists.
    pub template_dir: Option<PathBuf>,
    /// Directory raw messages are archived in until processed.
    pub failed_mails_dir: Option<PathBuf>,
    /// File listing the accepted signature tokens.
    pub signature_file: Option<PathBuf>,
    /// Log file; `None` uses the kind's default name in `base_dir`. Always written.
    pub log_file: Option<PathBuf>,
    /// External checker invocation.
    pub validator: ValidatorSettings,
    /// Shell template run for every stored file. `%m` is replaced by the
    /// change message and `%f` by the file path.
    pub scm_command: Option<String>,
    /// Outgoing mail settings.
    pub mail: MailSettings,
    /// Print outgoing mail instead of sending it and skip the SCM command.
    pub dry_run: bool,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self::for_kind(SheetKind::Status)
    }
}

impl ReceiverConfig {
    /// Name of the settings file inside the config directory.
    pub const FILE_NAME: &'static str = "receiver.json";

    /// Creates settings with the conventional layout for `kind`.
    pub fn for_kind(kind: SheetKind) -> Self {
        Self {
            kind,
            base_dir: PathBuf::from("."),
            sheet_dir: None,
            template_dir: None,
            failed_mails_dir: None,
            signature_file: None,
            log_file: None,
            validator: ValidatorSettings::default(),
            scm_command: None,
            mail: MailSettings::default(),
            dry_run: false,
        }
    }

    /// Loads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Default location of the settings file, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "sheet-receiver")
            .map(|dirs| dirs.config_dir().join(Self::FILE_NAME))
    }

    /// Resolves `path` against [`base_dir`](Self::base_dir) unless absolute.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Root of the sheet store.
    pub fn sheet_dir(&self) -> PathBuf {
        match &self.sheet_dir {
            Some(dir) => self.resolve(dir),
            None => self.resolve(self.kind.default_sheet_dir()),
        }
    }

    /// Template directory holding `<period>/resources.yml`.
    pub fn template_dir(&self) -> PathBuf {
        match &self.template_dir {
            Some(dir) => self.resolve(dir),
            None => self.resolve(self.kind.default_template_dir()),
        }
    }

    /// Failed-mail archive directory.
    pub fn failed_mails_dir(&self) -> PathBuf {
        match &self.failed_mails_dir {
            Some(dir) => self.resolve(dir),
            None => self.sheet_dir().join("FailedMails"),
        }
    }

    /// Accepted-period file.
    pub fn signature_file(&self) -> PathBuf {
        match &self.signature_file {
            Some(file) => self.resolve(file),
            None => self.template_dir().join("acceptable_intervals"),
        }
    }

    /// Log file path.
    pub fn log_file(&self) -> PathBuf {
        match &self.log_file {
            Some(file) => self.resolve(file),
            None => self.resolve(self.kind.default_log_file()),
        }
    }
}

/// External checker invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSettings {
    /// Program to run.
    pub program: String,
    /// Arguments placed before the silent flag and the kind's sub-command.
    pub args: Vec<String>,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            program: "tj3client".to_string(),
            args: Vec::new(),
        }
    }
}

/// Transport security for SMTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailSecurity {
    /// Plain SMTP, for a local relay.
    None,
    /// Upgrade with STARTTLS.
    StartTls,
    /// Implicit TLS.
    Tls,
}

/// Outgoing mail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    /// From address of notifications; also the operator fallback recipient.
    pub sender: String,
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port.
    pub smtp_port: u16,
    /// Connection security.
    pub security: MailSecurity,
    /// SMTP user name, if the relay requires authentication.
    pub username: Option<String>,
    /// SMTP password.
    pub password: Option<String>,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            sender: "sheets@localhost".to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 25,
            security: MailSecurity::None,
            username: None,
            password: None,
        }
    }
}
