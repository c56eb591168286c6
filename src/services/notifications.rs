//! Outcome notifications.
//!
//! Composes the one email every processed submission gets back:
//!
//! - a report on success,
//! - a rejection the submitter can act on,
//! - a generic out-of-service notice when the receiver itself is broken.

use std::sync::Arc;

use crate::domain::{MessageId, ReportingPeriod, SheetKind, ValidationOutcome};
use crate::providers::mail::{MailTransport, OutgoingMail, TransportError};

/// Subject of rejection mails.
pub const REJECTION_SUBJECT: &str = "Your time sheet submission failed!";

/// Subject of out-of-service notices.
pub const FATAL_SUBJECT: &str = "Temporary server error";

/// Composes and sends outcome emails.
#[derive(Clone)]
pub struct NotificationDispatcher {
    kind: SheetKind,
    transport: Arc<dyn MailTransport>,
    in_reply_to: Option<MessageId>,
}

impl NotificationDispatcher {
    /// Creates a dispatcher sending through `transport`.
    pub fn new(kind: SheetKind, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            kind,
            transport,
            in_reply_to: None,
        }
    }

    /// Marks outgoing mail as a reply to the submission.
    pub fn in_reply_to(mut self, id: MessageId) -> Self {
        self.in_reply_to = Some(id);
        self
    }

    /// Sends the success report.
    pub async fn send_success(
        &self,
        to: &str,
        name: &str,
        period: &ReportingPeriod,
        outcome: &ValidationOutcome,
    ) -> Result<(), TransportError> {
        self.send(to, format!("Report from {}", name), success_body(name, period, outcome))
            .await
    }

    /// Sends a rejection quoting `reason`, with the offending sheet appended.
    pub async fn send_rejection(
        &self,
        to: &str,
        reason: &str,
        sheet: Option<&str>,
    ) -> Result<(), TransportError> {
        self.send(to, REJECTION_SUBJECT.to_string(), with_sheet(reason, sheet))
            .await
    }

    /// Sends the out-of-service notice.
    pub async fn send_fatal(&self, to: &str, sheet: Option<&str>) -> Result<(), TransportError> {
        self.send(
            to,
            FATAL_SUBJECT.to_string(),
            with_sheet(&fatal_body(self.kind), sheet),
        )
        .await
    }

    async fn send(&self, to: &str, subject: String, body: String) -> Result<(), TransportError> {
        let mail = OutgoingMail {
            to: to.to_string(),
            subject,
            body,
            in_reply_to: self.in_reply_to.clone(),
        };
        self.transport.send(&mail).await
    }
}

/// Body of the success report.
pub fn success_body(name: &str, period: &ReportingPeriod, outcome: &ValidationOutcome) -> String {
    let mut text = format!("Report from {} for the period ending {}:\n\n", name, period);

    if outcome.has_warnings() {
        text.push_str(
            "Your report does contain some issues that you may want to fix or address with\n\
             your manager or project manager:\n\n",
        );
        text.push_str(&outcome.warnings);
        text.push_str("\n\n");
    }

    text.push_str(&outcome.report);
    text
}

/// Body of the out-of-service notice.
pub fn fatal_body(kind: SheetKind) -> String {
    format!(
        "We are sorry! The {kind} server detected a configuration\n\
         problem and is temporarily out of service. The administrator\n\
         has been notified and will try to rectify the situation as\n\
         soon as possible. Please re-submit your {kind} later!\n"
    )
}

fn with_sheet(message: &str, sheet: Option<&str>) -> String {
    match sheet {
        Some(sheet) if !sheet.is_empty() => format!("{}\n{}", message, sheet),
        _ => message.to_string(),
    }
}
