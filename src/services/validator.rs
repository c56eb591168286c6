//! External sheet checking.
//!
//! Deep validation is done by a separate checker process (`tj3client` by
//! default). The sheet goes in on stdin; the pretty-printed report comes back
//! on stdout and warnings or errors on stderr. Exit status 0 accepts the
//! sheet.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::ReceiverConfig;
use crate::domain::{CandidateSheet, SheetKind, ValidationOutcome};
use crate::error::{ReceiverError, Result};

/// Trait for sheet checkers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetChecker: Send + Sync {
    /// Checks a sheet whose header has already been accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::CheckFailed`] with the checker's message if
    /// the sheet is rejected, or [`ReceiverError::Infrastructure`] if the
    /// checker could not be run.
    async fn check(&self, sheet: &CandidateSheet) -> Result<ValidationOutcome>;
}

/// Runs the external checker process.
#[derive(Debug, Clone)]
pub struct ExternalValidator {
    kind: SheetKind,
    program: String,
    args: Vec<String>,
}

impl ExternalValidator {
    /// Creates a validator running `program` for sheets of `kind`.
    pub fn new(kind: SheetKind, program: impl Into<String>) -> Self {
        Self {
            kind,
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Creates a validator from the receiver settings.
    pub fn from_config(config: &ReceiverConfig) -> Self {
        Self::new(config.kind, config.validator.program.clone())
            .with_args(config.validator.args.clone())
    }

    /// Sets arguments placed before the fixed checker flags.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Full argument list passed to the program.
    pub fn arguments(&self) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend([
            "--silent".to_string(),
            self.kind.validator_command().to_string(),
            ".".to_string(),
        ]);
        args
    }
}

#[async_trait]
impl SheetChecker for ExternalValidator {
    async fn check(&self, sheet: &CandidateSheet) -> Result<ValidationOutcome> {
        let context = format!("Cannot check {}", self.kind);

        let mut child = Command::new(&self.program)
            .args(self.arguments())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ReceiverError::infrastructure(&context, e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReceiverError::infrastructure(&context, "stdin not captured"))?;

        // Input is written while both output pipes are drained so a checker
        // that answers early cannot fill a pipe and stall the exchange. The
        // input side is closed before the exit status is looked at.
        let input = sheet.text.as_bytes();
        let write_input = async move {
            let result = stdin.write_all(input).await;
            drop(stdin);
            result
        };
        let (written, output) = tokio::join!(write_input, child.wait_with_output());

        let output = output.map_err(|e| ReceiverError::infrastructure(&context, e))?;
        match written {
            Ok(()) => {}
            // The checker may exit without reading everything; its status decides.
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!("Checker closed its input early");
            }
            Err(e) => return Err(ReceiverError::infrastructure(&context, e)),
        }

        let report = String::from_utf8_lossy(&output.stdout).into_owned();
        let warnings = String::from_utf8_lossy(&output.stderr).into_owned();

        match output.status.code() {
            Some(0) => Ok(ValidationOutcome {
                accepted: true,
                report,
                warnings,
            }),
            Some(code) => {
                tracing::debug!(code, "Checker rejected sheet");
                if warnings.trim().is_empty() {
                    Err(ReceiverError::CheckFailed(format!(
                        "The {} was rejected by the checker (exit code {}).",
                        self.kind, code
                    )))
                } else {
                    Err(ReceiverError::CheckFailed(warnings))
                }
            }
            None => Err(ReceiverError::infrastructure(
                &context,
                format!("checker terminated by signal ({})", output.status),
            )),
        }
    }
}
