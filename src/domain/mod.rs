//! Domain layer types for the sheet receiver.
//!
//! This module contains the core types that flow through the intake
//! pipeline: incoming messages, candidate and filed sheets, and resource
//! records.

mod message;
mod resource;
mod sheet;
mod types;

pub use message::{Attachment, IncomingMessage};
pub use resource::ResourceRecord;
pub use sheet::{
    CandidateSheet, FiledSheet, SheetHeader, SheetKind, SheetSource, ValidationOutcome,
    INDEX_FILE_NAME, SHEET_EXTENSION,
};
pub use types::{MessageId, ReportingPeriod, ResourceId};
