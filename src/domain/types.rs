//! Core identifier types for domain entities.
//!
//! These newtype wrappers keep resource ids, reporting periods and message
//! ids from being mixed up when they travel through the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a resource (the person a sheet reports on).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub String);

impl ResourceId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// End date of a reporting period as written in a sheet header.
///
/// Also used as the name of the store directory the sheet is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportingPeriod(pub String);

impl ReportingPeriod {
    /// Returns the period as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ReportingPeriod {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ReportingPeriod {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// RFC 5322 Message-ID of an incoming submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Placeholder used when the message carries no Message-ID header.
    pub const UNKNOWN: &'static str = "unknown";

    /// Returns the sentinel id for messages without a Message-ID.
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_owned())
    }

    /// Returns true if this is the sentinel id.
    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    /// Returns a variant of the id that is safe to use as a single file name.
    pub fn file_name(&self) -> String {
        let name: String = self
            .0
            .chars()
            .map(|c| match c {
                '/' | '\\' | '\0' => '_',
                c => c,
            })
            .collect();
        match name.as_str() {
            "" | "." | ".." => Self::UNKNOWN.to_owned(),
            _ => name,
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
