//! Configuration and settings management.
//!
//! This module provides the receiver settings type and its loader.
//! Settings are stored as JSON and are immutable once loaded.

mod settings;

pub use settings::{ConfigError, MailSecurity, MailSettings, ReceiverConfig, ValidatorSettings};
