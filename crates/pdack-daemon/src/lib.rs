//! # pdack-daemon
//!
//! The auto-acknowledge daemon and its notification sinks.
//!
//! This crate provides:
//! - [`AutoAckDaemon`] - Polling state machine that acknowledges old triggered incidents
//! - [`DaemonConfig`] - Interval (cadence and age threshold) in minutes, capped at one week
//! - [`CycleOutcome`] - Typed result of one cycle at the cycle boundary
//! - [`Notifier`] / [`DesktopNotifier`] - Best-effort terminal and OS notifications

pub mod daemon;
pub mod notify;

pub use daemon::{
    AUTO_ACK_TITLE, AutoAckDaemon, CycleOutcome, CycleReport, DEFAULT_INTERVAL_MINUTES,
    DaemonConfig, DaemonState, DaemonSummary, MAX_INTERVAL_MINUTES,
};
pub use notify::{DesktopNotifier, Notifier};
