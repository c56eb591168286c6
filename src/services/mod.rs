//! Pipeline services layer.
//!
//! This module contains the stages a submission passes through, and the
//! controller that drives them.
//!
//! # Architecture
//!
//! Services sit between the binary and the infrastructure layer:
//!
//! ```text
//! Binary (stdin, CLI, exit status)
//!          |
//!          v
//!    Services Layer  <-- You are here
//!          |
//!          v
//! Infrastructure (Providers, Storage)
//! ```
//!
//! # Services Overview
//!
//! - [`SheetExtractor`]: Yields candidate sheet texts from a message
//! - [`SignatureValidator`]: Recognizes the header and checks the reporting period
//! - [`ExternalValidator`]: Runs the external sheet checker
//! - [`ResourceDirectory`]: Resolves resource ids to names and addresses
//! - [`SheetFiler`] and [`InclusionIndexer`]: Store sheets and rebuild the period index
//! - [`NotificationDispatcher`]: Composes and sends outcome emails
//! - [`ReceiverController`]: Runs the whole pipeline for one message

mod extractor;
mod filer;
mod indexer;
mod notifications;
mod receiver;
mod resources;
mod signature;
mod validator;

pub use extractor::{normalize_line_breaks, SheetExtractor};
pub use filer::SheetFiler;
pub use indexer::InclusionIndexer;
pub use notifications::{
    fatal_body, success_body, NotificationDispatcher, FATAL_SUBJECT, REJECTION_SUBJECT,
};
pub use receiver::{Disposition, ReceiverController};
pub use resources::{ResourceDirectory, RESOURCE_FILE_NAME};
pub use signature::{AcceptedPeriods, SheetGrammar, SignatureValidator};
pub use validator::{ExternalValidator, SheetChecker};
