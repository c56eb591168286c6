//! Incoming message domain types.
//!
//! An [`IncomingMessage`] is one raw submission as delivered on stdin,
//! together with the few parts the pipeline looks at.

use mail_parser::{MessageParser, MimeHeaders};

use super::MessageId;

/// A single raw email submission.
///
/// Immutable once read. The raw bytes are kept so the message can be
/// archived verbatim for manual reprocessing.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Raw RFC 5322 bytes as received.
    pub raw: Vec<u8>,
    /// Sender address from the From header, if any.
    pub sender: Option<String>,
    /// Message-ID header, or the `unknown` sentinel.
    pub message_id: MessageId,
    /// Attachments in message order.
    pub attachments: Vec<Attachment>,
    /// Decoded plain text body.
    pub body: String,
}

/// A decoded message attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Original filename, if the part declared one.
    pub filename: Option<String>,
    /// Decoded body, lossily converted to UTF-8.
    pub body: String,
}

impl Attachment {
    /// Creates an attachment with a filename.
    pub fn new(filename: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            body: body.into(),
        }
    }

    /// Returns true if the filename ends with `suffix` (case-sensitive).
    pub fn has_suffix(&self, suffix: &str) -> bool {
        self.filename
            .as_deref()
            .is_some_and(|name| name.ends_with(suffix))
    }
}

impl IncomingMessage {
    /// Parses raw message bytes.
    ///
    /// Messages that cannot be parsed as MIME are kept as a bare body so
    /// they still go through the pipeline and end up archived.
    pub fn parse(raw: Vec<u8>) -> Self {
        let Some(parts) = ParsedParts::from_raw(&raw) else {
            tracing::warn!("Incoming message is not valid MIME, treating it as plain text");
            let body = String::from_utf8_lossy(&raw).into_owned();
            return Self {
                raw,
                sender: None,
                message_id: MessageId::unknown(),
                attachments: Vec::new(),
                body,
            };
        };

        Self {
            raw,
            sender: parts.sender,
            message_id: parts.message_id,
            attachments: parts.attachments,
            body: parts.body,
        }
    }
}

/// Owned fields pulled out of a parsed MIME message.
struct ParsedParts {
    sender: Option<String>,
    message_id: MessageId,
    attachments: Vec<Attachment>,
    body: String,
}

impl ParsedParts {
    fn from_raw(raw: &[u8]) -> Option<Self> {
        let message = MessageParser::default().parse(raw)?;

        let sender = message
            .from()
            .and_then(|addr| addr.as_list())
            .and_then(|list| list.first())
            .and_then(|addr| addr.address())
            .map(|s| s.to_string());

        let message_id = message
            .message_id()
            .filter(|id| !id.trim().is_empty())
            .map(MessageId::from)
            .unwrap_or_else(MessageId::unknown);

        let attachments = message
            .attachments()
            .map(|part| Attachment {
                filename: part.attachment_name().map(|s| s.to_string()),
                body: String::from_utf8_lossy(part.contents()).into_owned(),
            })
            .collect();

        let body = message
            .body_text(0)
            .map(|text| text.into_owned())
            .unwrap_or_default();

        Some(Self {
            sender,
            message_id,
            attachments,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MULTIPART: &str = "From: Alice <alice@example.com>\r\n\
To: sheets@example.com\r\n\
Subject: My sheet\r\n\
Message-ID: <abc123@example.com>\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n\
\r\n\
--XYZ\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
See attached.\r\n\
--XYZ\r\n\
Content-Type: text/plain; name=\"week.tji\"\r\n\
Content-Disposition: attachment; filename=\"week.tji\"\r\n\
\r\n\
statussheet alice 2024-03-01\r\n\
--XYZ--\r\n";

    #[test]
    fn parses_sender_id_and_attachments() {
        let message = IncomingMessage::parse(MULTIPART.as_bytes().to_vec());

        assert_eq!(message.sender.as_deref(), Some("alice@example.com"));
        assert_eq!(message.message_id, MessageId::from("abc123@example.com"));
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.attachments[0].filename.as_deref(), Some("week.tji"));
        assert!(message.attachments[0]
            .body
            .contains("statussheet alice 2024-03-01"));
        assert!(message.body.contains("See attached."));
    }

    #[test]
    fn missing_message_id_uses_sentinel() {
        let raw = "From: bob@example.com\r\nSubject: hi\r\n\r\nbody\r\n";
        let message = IncomingMessage::parse(raw.as_bytes().to_vec());

        assert!(message.message_id.is_unknown());
        assert!(message.attachments.is_empty());
        assert!(message.body.contains("body"));
    }

    #[test]
    fn raw_bytes_are_preserved() {
        let message = IncomingMessage::parse(MULTIPART.as_bytes().to_vec());
        assert_eq!(message.raw, MULTIPART.as_bytes());
    }

    #[test]
    fn attachment_suffix_is_case_sensitive() {
        assert!(Attachment::new("week.tji", "").has_suffix(".tji"));
        assert!(!Attachment::new("week.TJI", "").has_suffix(".tji"));
        assert!(!Attachment {
            filename: None,
            body: String::new()
        }
        .has_suffix(".tji"));
    }
}
