//! External collaborator implementations.
//!
//! This module contains the traits and implementations for the systems the
//! receiver talks to but does not own:
//!
//! - [`mail`] - outgoing notification transports (SMTP, dry run)
//! - [`scm`] - version-control recording of filed sheets

pub mod mail;
pub mod scm;
