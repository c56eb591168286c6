//! SMTP transport implementation.
//!
//! Sends notifications through a relay using `lettre`, with plain SMTP for a
//! local relay, STARTTLS, or implicit TLS.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use super::{build_message, MailTransport, OutgoingMail, Result, TransportError};
use crate::config::{MailSecurity, MailSettings};

/// Mail transport backed by an SMTP relay.
#[derive(Clone)]
pub struct SmtpTransport {
    sender: String,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Creates a transport for the configured relay.
    ///
    /// No connection is made until the first message is sent.
    pub fn new(settings: &MailSettings) -> Result<Self> {
        let builder = match settings.security {
            MailSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
                .map_err(|e| TransportError::Connection(format!("SMTP relay error: {}", e)))?,
            MailSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
                    .map_err(|e| TransportError::Connection(format!("SMTP relay error: {}", e)))?
            }
            MailSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.smtp_host)
            }
        };

        let mut builder = builder.port(settings.smtp_port);
        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(SmtpCredentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            sender: settings.sender.clone(),
            mailer: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let message = build_message(&self.sender, mail)?;

        let response = self
            .mailer
            .send(message)
            .await
            .map_err(|e| TransportError::Connection(format!("SMTP send failed: {}", e)))?;

        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            code = %response.code(),
            "Notification sent via SMTP"
        );
        Ok(())
    }
}
