//! Outgoing mail transports.
//!
//! This module contains the [`MailTransport`] trait and its implementations:
//!
//! - [`SmtpTransport`] - delivery through an SMTP relay
//! - [`DryRunTransport`] - prints formatted messages to stdout

mod dry_run;
mod smtp;
mod traits;

pub use dry_run::DryRunTransport;
pub use smtp::SmtpTransport;
pub use traits::{build_message, MailTransport, OutgoingMail, Result, TransportError};
