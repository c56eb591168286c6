//! Resource directory records.

use serde::{Deserialize, Serialize};

use super::ResourceId;

/// A person who submits sheets.
///
/// Stored on disk as a three element sequence `[id, name, email]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String, String)", into = "(String, String, String)")]
pub struct ResourceRecord {
    /// Resource identifier used in sheet headers.
    pub id: ResourceId,
    /// Display name.
    pub name: String,
    /// Address replies are sent to.
    pub email: String,
}

impl ResourceRecord {
    /// Creates a new record.
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: ResourceId(id.into()),
            name: name.into(),
            email: email.into(),
        }
    }
}

impl From<(String, String, String)> for ResourceRecord {
    fn from((id, name, email): (String, String, String)) -> Self {
        Self::new(id, name, email)
    }
}

impl From<ResourceRecord> for (String, String, String) {
    fn from(record: ResourceRecord) -> Self {
        (record.id.0, record.name, record.email)
    }
}
