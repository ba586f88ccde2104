//! # pdack-api
//!
//! Minimal PagerDuty REST client for pdack.
//!
//! This crate provides:
//! - [`IncidentApi`] - The three remote operations pdack needs
//! - [`PagerDutyClient`] - reqwest implementation with token auth and timeouts
//! - [`Session`] - Current-user identity, resolved once
//! - [`ApiError`] - Auth, status, network and decode failures
//!
//! It is deliberately not a general SDK: it reads the current user, lists
//! incidents by status (first page of 100 only) and acknowledges incidents.

pub mod api;
pub mod api_types;
pub mod client;
pub mod error;

pub use api::{IncidentApi, Session};
pub use client::{ClientConfig, PagerDutyClient};
pub use error::{ApiError, Result};
