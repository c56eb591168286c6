//! Sheet domain types.
//!
//! A sheet moves through the pipeline as a [`CandidateSheet`], gains a
//! [`SheetHeader`] once recognized, is checked into a [`ValidationOutcome`]
//! and ends up as a [`FiledSheet`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::{ReportingPeriod, ResourceId};

/// File extension that marks an attachment as a sheet.
pub const SHEET_EXTENSION: &str = ".tji";

/// Name of the aggregate index file in each period directory.
pub const INDEX_FILE_NAME: &str = "all.tji";

/// Which kind of sheet a receiver instance handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SheetKind {
    /// Weekly time sheets.
    Time,
    /// Status sheets.
    Status,
}

impl SheetKind {
    /// Human readable label used in messages ("time sheet").
    pub fn label(&self) -> &'static str {
        match self {
            SheetKind::Time => "time sheet",
            SheetKind::Status => "status sheet",
        }
    }

    /// Sub-command the external checker uses for this kind.
    pub fn validator_command(&self) -> &'static str {
        match self {
            SheetKind::Time => "check-ts",
            SheetKind::Status => "check-ss",
        }
    }

    /// Default name of the sheet store root.
    pub fn default_sheet_dir(&self) -> &'static str {
        match self {
            SheetKind::Time => "TimeSheets",
            SheetKind::Status => "StatusSheets",
        }
    }

    /// Default name of the template directory.
    pub fn default_template_dir(&self) -> &'static str {
        match self {
            SheetKind::Time => "TimeSheetTemplates",
            SheetKind::Status => "StatusSheetTemplates",
        }
    }

    /// Default log file name.
    pub fn default_log_file(&self) -> &'static str {
        match self {
            SheetKind::Time => "timesheets.log",
            SheetKind::Status => "statussheets.log",
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sheet text extracted from a message.
///
/// Line breaks are normalized to `\n` and the text starts at the header
/// line when one was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSheet {
    /// Where in the message the text came from.
    pub source: SheetSource,
    /// Normalized sheet text.
    pub text: String,
}

impl CandidateSheet {
    /// Creates a candidate from already normalized text.
    pub fn new(source: SheetSource, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
        }
    }
}

/// Origin of a candidate within the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSource {
    /// An attachment with the given file name.
    Attachment(String),
    /// The message body.
    Body,
}

impl fmt::Display for SheetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSource::Attachment(name) => write!(f, "attachment '{}'", name),
            SheetSource::Body => f.write_str("message body"),
        }
    }
}

/// Fields read from a recognized sheet header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetHeader {
    /// Resource the sheet reports on.
    pub resource_id: ResourceId,
    /// End date of the reporting period.
    pub period: ReportingPeriod,
    /// Signature token checked against the accepted periods.
    pub signature: String,
}

/// Result of a successful external check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Always true for outcomes that reach the filer.
    pub accepted: bool,
    /// Pretty printed sheet from the checker's output channel.
    pub report: String,
    /// Non-fatal issues from the checker's error channel.
    pub warnings: String,
}

impl ValidationOutcome {
    /// Returns true if the checker reported any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.trim().is_empty()
    }
}

/// A sheet that has been written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiledSheet {
    /// Resource the sheet reports on.
    pub resource_id: ResourceId,
    /// Reporting period directory it was filed under.
    pub period: ReportingPeriod,
    /// Full path of the sheet file.
    pub path: PathBuf,
}

impl FiledSheet {
    /// Deterministic file name for a resource and period.
    pub fn file_name(resource_id: &ResourceId, period: &ReportingPeriod) -> String {
        format!("{}_{}{}", resource_id, period, SHEET_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_kind_labels() {
        assert_eq!(SheetKind::Time.label(), "time sheet");
        assert_eq!(SheetKind::Status.to_string(), "status sheet");
    }

    #[test]
    fn sheet_kind_validator_commands() {
        assert_eq!(SheetKind::Time.validator_command(), "check-ts");
        assert_eq!(SheetKind::Status.validator_command(), "check-ss");
    }

    #[test]
    fn sheet_kind_serialization() {
        let json = serde_json::to_string(&SheetKind::Status).unwrap();
        assert_eq!(json, "\"status\"");

        let kind: SheetKind = serde_json::from_str("\"time\"").unwrap();
        assert_eq!(kind, SheetKind::Time);
    }

    #[test]
    fn filed_sheet_file_name() {
        let name = FiledSheet::file_name(
            &ResourceId::from("alice"),
            &ReportingPeriod::from("2024-03-01"),
        );
        assert_eq!(name, "alice_2024-03-01.tji");
    }

    #[test]
    fn outcome_warnings_ignore_whitespace() {
        let outcome = ValidationOutcome {
            accepted: true,
            report: "OK".to_string(),
            warnings: " \n".to_string(),
        };
        assert!(!outcome.has_warnings());
    }
}
