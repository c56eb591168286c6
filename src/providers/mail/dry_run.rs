//! Dry-run transport that prints notifications instead of sending them.

use std::io::Write;

use async_trait::async_trait;

use super::{build_message, MailTransport, OutgoingMail, Result, TransportError};

/// Writes each formatted message to stdout.
#[derive(Debug, Clone)]
pub struct DryRunTransport {
    sender: String,
}

impl DryRunTransport {
    /// Creates a dry-run transport using `sender` as the From address.
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl MailTransport for DryRunTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let message = build_message(&self.sender, mail)?;

        {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&message.formatted())
                .and_then(|_| stdout.write_all(b"\n"))
                .and_then(|_| stdout.flush())
                .map_err(|e| TransportError::Output(e.to_string()))?;
        }

        tracing::info!(to = %mail.to, subject = %mail.subject, "Dry run: notification printed");
        Ok(())
    }
}
