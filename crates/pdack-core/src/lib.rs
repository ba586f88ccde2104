//! # pdack-core
//!
//! Core types, errors, and utilities shared by the pdack crates.
//!
//! This crate provides:
//! - [`PdackError`] - Errors for configuration, local I/O and parsing
//! - [`logging`] - Tracing setup and log file management
//! - [`types`] - The [`Incident`] snapshot and its status
//! - [`age`] - Incident age evaluation against a single reference instant
//! - [`format`] - Terminal and notification rendering of incidents

pub mod age;
pub mod error;
pub mod format;
pub mod logging;
pub mod types;

// Re-export main types for convenience
pub use error::{PdackError, Result};
pub use logging::{LogGuard, init_logging};
pub use types::{Incident, IncidentId, IncidentStatus, UserId};
