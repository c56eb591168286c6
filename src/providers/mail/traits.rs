//! Mail transport trait definition.
//!
//! This module defines the [`MailTransport`] trait the notification
//! dispatcher sends through. Implementations deliver a fully composed
//! [`OutgoingMail`]; they do not decide what to say.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::Message;

use crate::domain::MessageId;

/// Result type alias for mail transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while sending mail.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// A sender or recipient address could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled.
    #[error("failed to build message: {0}")]
    Build(String),

    /// Network or relay error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Local output error (dry-run printing).
    #[error("output error: {0}")]
    Output(String),
}

/// A composed plain-text notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
    /// Message-ID of the submission this answers.
    pub in_reply_to: Option<MessageId>,
}

/// Trait for outgoing mail transports.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Sends one message.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the message cannot be built or delivered.
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

/// Builds an RFC 5322 message from an [`OutgoingMail`].
pub fn build_message(sender: &str, mail: &OutgoingMail) -> Result<Message> {
    let from: Mailbox = sender
        .parse()
        .map_err(|e| TransportError::InvalidAddress(format!("invalid from address: {}", e)))?;
    let to: Mailbox = mail
        .to
        .parse()
        .map_err(|e| TransportError::InvalidAddress(format!("invalid to address: {}", e)))?;

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.clone());

    if let Some(id) = mail.in_reply_to.as_ref().filter(|id| !id.is_unknown()) {
        builder = builder.in_reply_to(format!("<{}>", id));
    }

    builder
        .header(ContentType::TEXT_PLAIN)
        .body(mail.body.clone())
        .map_err(|e| TransportError::Build(e.to_string()))
}
