//! Incident domain types shared across pdack crates.
//!
//! An [`Incident`] is a snapshot taken from one API fetch. Nothing here is
//! persisted; each daemon cycle re-fetches the full state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Remote identifier of an incident (e.g. `PABC123`).
pub type IncidentId = String;

/// Remote identifier of a user.
pub type UserId = String;

/// Placeholder for a service or assignee the API omits.
pub const UNKNOWN: &str = "Unknown";

/// Summary shown when the API omits one.
pub const NO_SUMMARY: &str = "No summary";

/// Assignee shown when nobody is assigned.
pub const UNASSIGNED: &str = "Unassigned";

/// Incident status as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    /// Newly opened, unacknowledged
    Triggered,
    /// Claimed by a responder
    Acknowledged,
    /// Anything else (resolved, ...). Never acted upon.
    #[serde(other)]
    Other,
}

impl IncidentStatus {
    /// Value used for the `statuses[]` query parameter.
    ///
    /// `Other` has no query form and yields `None`.
    pub fn as_query(&self) -> Option<&'static str> {
        match self {
            Self::Triggered => Some("triggered"),
            Self::Acknowledged => Some("acknowledged"),
            Self::Other => None,
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Triggered => write!(f, "triggered"),
            Self::Acknowledged => write!(f, "acknowledged"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// One incident as observed in a single fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    pub id: IncidentId,
    /// Human-facing incident number, when the API provides one
    pub number: Option<u64>,
    pub status: IncidentStatus,
    pub created_at: DateTime<Utc>,
    pub service: String,
    pub summary: String,
    pub assignee: Option<String>,
    /// True when the incident carries a priority
    pub priority: bool,
}

impl Incident {
    /// Display number, falling back to the id.
    pub fn display_number(&self) -> String {
        match self.number {
            Some(n) => n.to_string(),
            None => self.id.clone(),
        }
    }

    /// Assignee name or [`UNASSIGNED`].
    pub fn assignee_or_default(&self) -> &str {
        self.assignee.as_deref().unwrap_or(UNASSIGNED)
    }

    pub fn is_triggered(&self) -> bool {
        self.status == IncidentStatus::Triggered
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn incident(id: &str, status: IncidentStatus, created_at: &str) -> Incident {
        Incident {
            id: id.to_string(),
            number: Some(42),
            status,
            created_at: crate::age::parse_timestamp(created_at).unwrap(),
            service: "checkout-api".to_string(),
            summary: "High error rate on /pay".to_string(),
            assignee: None,
            priority: false,
        }
    }
}
