//! sheet-receiver - Email intake for time and status sheets
//!
//! This crate receives one submitted sheet per invocation as a raw email,
//! checks it, files it into a date-partitioned store and answers the
//! submitter by email.

pub mod config;
pub mod domain;
pub mod error;
pub mod providers;
pub mod services;
pub mod storage;

pub use config::ReceiverConfig;
pub use error::{ReceiverError, Result, Severity};
pub use services::{Disposition, ReceiverController};
