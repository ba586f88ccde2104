//! The incident API seam and the per-process session context.
//!
//! [`IncidentApi`] abstracts the three remote operations pdack needs so the
//! daemon can run against [`crate::PagerDutyClient`] in production and an
//! in-memory fake in tests.

use async_trait::async_trait;
use pdack_core::{Incident, IncidentStatus, UserId};
use tracing::info;

use crate::error::Result;

/// Remote operations on incidents.
#[async_trait]
pub trait IncidentApi: Send + Sync {
    /// Resolve the user that owns the API key.
    ///
    /// Any non-success response is an [`crate::ApiError::Auth`].
    async fn current_user(&self) -> Result<UserId>;

    /// Fetch incidents assigned to `user_id`, one request per status.
    ///
    /// Results are concatenated in the order of `statuses`. A failure on any
    /// status fails the whole call; no partial list is returned.
    async fn fetch_incidents(
        &self,
        user_id: &str,
        statuses: &[IncidentStatus],
    ) -> Result<Vec<Incident>>;

    /// Transition one incident to acknowledged.
    ///
    /// `Ok(false)` means the API answered with anything but success (already
    /// acknowledged by someone else, resolved meanwhile, ...). Only transport
    /// failures are errors.
    async fn acknowledge_incident(&self, incident_id: &str) -> Result<bool>;
}

/// Identity resolved once at startup and shared for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
}

impl Session {
    /// Create a session for a known user id.
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    /// Resolve the current user through the API.
    pub async fn resolve(api: &dyn IncidentApi) -> Result<Self> {
        let user_id = api.current_user().await?;
        info!(user_id = %user_id, "resolved current user");
        Ok(Self { user_id })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
