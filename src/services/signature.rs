//! Sheet header recognition and reporting-period acceptance.
//!
//! A sheet starts with a header line such as
//!
//! ```text
//! statussheet alice 2024-03-01
//! ```
//!
//! The header names the resource and the end of the reporting period. The
//! signature token at the same position must appear in the accepted-period
//! file published by the operator.

use std::collections::HashSet;
use std::path::PathBuf;

use regex::Regex;

use crate::domain::{CandidateSheet, ReportingPeriod, ResourceId, SheetHeader, SheetKind};
use crate::error::{ReceiverError, Result};

// Fields are separated by blanks only; a header never continues on the next line.
const HEADER_PATTERN: &str =
    r"(?m)^[ \t]*statussheet[ \t]+([a-z][a-z0-9_]*)[ \t]+([0-9]+-[0-9]+-[0-9]+)";
const SIGNATURE_PATTERN: &str = r"(?m)^[ \t]*statussheet[ \t]+[a-z][a-z0-9_]*[ \t]+([0-9:\-+]*)";

/// Compiled header and signature patterns.
#[derive(Debug, Clone)]
pub struct SheetGrammar {
    header: Regex,
    signature: Regex,
}

impl SheetGrammar {
    /// Compiles the header grammar.
    pub fn new() -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            header: Regex::new(HEADER_PATTERN)?,
            signature: Regex::new(SIGNATURE_PATTERN)?,
        })
    }

    /// Byte offset of the start of the first header line in `text`.
    pub fn header_start(&self, text: &str) -> Option<usize> {
        self.header.find(text).map(|m| m.start())
    }

    /// Reads the header of a candidate.
    ///
    /// Returns `Ok(None)` if the text carries no header at all.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::MalformedSheet`] if the header is present but
    /// the signature token cannot be read from it.
    pub fn read_header(&self, kind: SheetKind, text: &str) -> Result<Option<SheetHeader>> {
        let Some(caps) = self.header.captures(text) else {
            return Ok(None);
        };

        let signature = self
            .signature
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(ReceiverError::MalformedSheet { kind })?;

        Ok(Some(SheetHeader {
            resource_id: ResourceId::from(&caps[1]),
            period: ReportingPeriod::from(&caps[2]),
            signature,
        }))
    }
}

/// Set of reporting-period tokens currently accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptedPeriods(HashSet<String>);

impl AcceptedPeriods {
    /// Parses the accepted-period file: one token per line, blank lines ignored.
    pub fn parse(content: &str) -> Self {
        Self(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Returns true if `token` is accepted.
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    /// Number of accepted tokens.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no token is accepted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Checks candidate headers against the accepted-period file.
#[derive(Debug, Clone)]
pub struct SignatureValidator {
    grammar: SheetGrammar,
    kind: SheetKind,
    signature_file: PathBuf,
}

impl SignatureValidator {
    /// Creates a validator reading accepted periods from `signature_file`.
    pub fn new(grammar: SheetGrammar, kind: SheetKind, signature_file: impl Into<PathBuf>) -> Self {
        Self {
            grammar,
            kind,
            signature_file: signature_file.into(),
        }
    }

    /// Reads the header of a candidate, see [`SheetGrammar::read_header`].
    pub fn read_header(&self, sheet: &CandidateSheet) -> Result<Option<SheetHeader>> {
        self.grammar.read_header(self.kind, &sheet.text)
    }

    /// Loads the accepted-period file.
    pub async fn accepted_periods(&self) -> Result<AcceptedPeriods> {
        match tokio::fs::read_to_string(&self.signature_file).await {
            Ok(content) => {
                let periods = AcceptedPeriods::parse(&content);
                if periods.is_empty() {
                    tracing::warn!(path = %self.signature_file.display(), "No reporting period is open");
                } else {
                    tracing::debug!(count = periods.len(), "Accepted periods loaded");
                }
                Ok(periods)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ReceiverError::MissingSignatureFile {
                    path: self.signature_file.clone(),
                })
            }
            Err(e) => Err(ReceiverError::infrastructure(
                format!("Cannot read {}", self.signature_file.display()),
                e,
            )),
        }
    }

    /// Verifies that the header's signature is an accepted period.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::RejectedPeriod`] if it is not.
    pub async fn check(&self, header: &SheetHeader) -> Result<()> {
        let accepted = self.accepted_periods().await?;
        if !accepted.contains(&header.signature) {
            return Err(ReceiverError::RejectedPeriod {
                signature: header.signature.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SheetSource;
    use pretty_assertions::assert_eq;

    fn grammar() -> SheetGrammar {
        SheetGrammar::new().unwrap()
    }

    #[test]
    fn reads_header_fields() {
        let header = grammar()
            .read_header(SheetKind::Status, "  statussheet alice 2024-03-01\n  task x\n")
            .unwrap()
            .unwrap();

        assert_eq!(header.resource_id, ResourceId::from("alice"));
        assert_eq!(header.period, ReportingPeriod::from("2024-03-01"));
        assert_eq!(header.signature, "2024-03-01");
    }

    #[test]
    fn signature_keeps_time_suffix() {
        let header = grammar()
            .read_header(SheetKind::Status, "statussheet bob_2 2024-03-01-12:00+0100\n")
            .unwrap()
            .unwrap();

        assert_eq!(header.period, ReportingPeriod::from("2024-03-01"));
        assert_eq!(header.signature, "2024-03-01-12:00+0100");
    }

    #[test]
    fn header_must_start_a_line() {
        let result = grammar()
            .read_header(SheetKind::Status, "see statussheet alice 2024-03-01\n")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn header_fields_must_share_a_line() {
        let result = grammar()
            .read_header(SheetKind::Status, "statussheet\nalice 2024-03-01\n")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn resource_id_must_start_with_a_letter() {
        let result = grammar()
            .read_header(SheetKind::Status, "statussheet 1alice 2024-03-01\n")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn accepted_periods_are_line_delimited() {
        let periods = AcceptedPeriods::parse("2024-03-01\n\n 2024-03-08 \n");
        assert_eq!(periods.len(), 2);
        assert!(periods.contains("2024-03-08"));
        assert!(!periods.contains("2024-03"));
    }

    #[tokio::test]
    async fn rejects_periods_not_on_the_list() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("acceptable_intervals");
        std::fs::write(&file, "2024-03-08\n").unwrap();
        let validator = SignatureValidator::new(grammar(), SheetKind::Status, &file);

        let sheet = CandidateSheet::new(SheetSource::Body, "statussheet alice 2024-03-01\n");
        let header = validator.read_header(&sheet).unwrap().unwrap();

        let result = validator.check(&header).await;
        assert!(matches!(
            result,
            Err(ReceiverError::RejectedPeriod { ref signature }) if signature == "2024-03-01"
        ));
    }

    #[tokio::test]
    async fn accepts_listed_periods() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("acceptable_intervals");
        std::fs::write(&file, "2024-03-01\n").unwrap();
        let validator = SignatureValidator::new(grammar(), SheetKind::Status, &file);

        let sheet = CandidateSheet::new(SheetSource::Body, "statussheet alice 2024-03-01\n");
        let header = validator.read_header(&sheet).unwrap().unwrap();

        assert!(validator.check(&header).await.is_ok());
    }

    #[tokio::test]
    async fn missing_period_file_is_a_user_error() {
        let dir = tempfile::tempdir().unwrap();
        let validator =
            SignatureValidator::new(grammar(), SheetKind::Status, dir.path().join("missing"));

        let result = validator.accepted_periods().await;
        let err = result.unwrap_err();
        assert!(matches!(err, ReceiverError::MissingSignatureFile { .. }));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn empty_period_file_accepts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("acceptable_intervals");
        std::fs::write(&file, "\n  \n").unwrap();
        let validator = SignatureValidator::new(grammar(), SheetKind::Status, &file);

        let periods = validator.accepted_periods().await.unwrap();
        assert!(periods.is_empty());

        let sheet = CandidateSheet::new(SheetSource::Body, "statussheet alice 2024-03-01\n");
        let header = validator.read_header(&sheet).unwrap().unwrap();
        assert!(validator.check(&header).await.is_err());
    }
}
