//! Pipeline failure types.
//!
//! Every component reports failures as a [`ReceiverError`]. Each variant
//! belongs to one of two classes, see [`Severity`]: user-facing rejections
//! that the submitter can fix, and operator-fatal problems that stop the
//! receiver until an administrator steps in.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{ResourceId, SheetKind};

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, ReceiverError>;

/// Failure class of a [`ReceiverError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The submitter must fix and resubmit. The next candidate is tried.
    User,
    /// Configuration or infrastructure problem. Processing stops at once.
    Fatal,
}

/// Errors raised while processing a submission.
///
/// The `Display` text of user-facing variants is sent to the submitter
/// verbatim, so it is written for them.
#[derive(Debug, Error)]
pub enum ReceiverError {
    /// No candidate in the message carried a sheet header.
    #[error(
        "No {kind} found in email. Please make sure the header syntax is\n\
         correct and contained in a single line that starts at the beginning of the\n\
         line. If you had the {kind} attached, the file name must have a\n\
         '.tji' extension to be found."
    )]
    NoSheetFound {
        /// Kind of sheet that was expected.
        kind: SheetKind,
    },

    /// A header was recognized but the signature could not be read from it.
    #[error("No {kind} header found")]
    MalformedSheet {
        /// Kind of sheet that was expected.
        kind: SheetKind,
    },

    /// The signature token is not on the accepted list.
    #[error(
        "The reporting period {signature}\n\
         was not accepted!  Either you have modified the sheet header,\n\
         you are submitting the sheet too late or too early."
    )]
    RejectedPeriod {
        /// Signature token read from the header.
        signature: String,
    },

    /// The accepted-period file has not been published yet.
    #[error("{} does not exist yet.", .path.display())]
    MissingSignatureFile {
        /// Expected location of the file.
        path: PathBuf,
    },

    /// The external checker rejected the sheet; the payload is its error output.
    #[error("{0}")]
    CheckFailed(String),

    /// The header names a resource the directory does not know.
    #[error("Resource ID '{0}' not found in list")]
    UnknownResource(ResourceId),

    /// Filesystem, process or data source failure.
    #[error("{0}")]
    Infrastructure(String),
}

impl ReceiverError {
    /// Builds an infrastructure failure from a context string and a cause.
    pub fn infrastructure(context: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::Infrastructure(format!("{}: {}", context, err))
    }

    /// Returns the failure class of this error.
    pub fn severity(&self) -> Severity {
        match self {
            ReceiverError::MalformedSheet { .. } | ReceiverError::Infrastructure(_) => {
                Severity::Fatal
            }
            ReceiverError::NoSheetFound { .. }
            | ReceiverError::RejectedPeriod { .. }
            | ReceiverError::MissingSignatureFile { .. }
            | ReceiverError::CheckFailed(_)
            | ReceiverError::UnknownResource(_) => Severity::User,
        }
    }

    /// Returns true for operator-fatal failures.
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
