//! PagerDuty REST request and response types.
//!
//! Serde types for the three endpoints pdack talks to. Responses are
//! converted into [`pdack_core::Incident`] before leaving this crate.

use pdack_core::age::parse_timestamp;
use pdack_core::types::{NO_SUMMARY, UNKNOWN};
use pdack_core::{Incident, IncidentStatus};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Response of `GET /users/me`.
#[derive(Debug, Deserialize)]
pub struct UserEnvelope {
    pub user: ApiUser,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
    pub id: String,
}

/// Response of `GET /incidents`.
#[derive(Debug, Deserialize)]
pub struct IncidentsEnvelope {
    pub incidents: Vec<ApiIncident>,
    /// Set when the server has more results than the requested page
    #[serde(default)]
    pub more: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApiIncident {
    pub id: String,
    #[serde(default)]
    pub incident_number: Option<u64>,
    pub status: IncidentStatus,
    pub created_at: String,
    #[serde(default)]
    pub service: Option<ApiReference>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub assignments: Vec<ApiAssignment>,
    #[serde(default)]
    pub priority: Option<serde_json::Value>,
}

/// Generic `{ "summary": ... }` reference object.
#[derive(Debug, Deserialize)]
pub struct ApiReference {
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiAssignment {
    #[serde(default)]
    pub assignee: Option<ApiReference>,
}

impl TryFrom<ApiIncident> for Incident {
    type Error = ApiError;

    fn try_from(raw: ApiIncident) -> Result<Self, Self::Error> {
        let created_at = parse_timestamp(&raw.created_at)
            .map_err(|e| ApiError::Decode(format!("incident {}: {}", raw.id, e)))?;

        let service = raw
            .service
            .and_then(|s| s.summary)
            .unwrap_or_else(|| UNKNOWN.to_string());

        // Only the first assignment is shown
        let assignee = raw.assignments.into_iter().next().map(|a| {
            a.assignee
                .and_then(|r| r.summary)
                .unwrap_or_else(|| UNKNOWN.to_string())
        });

        Ok(Incident {
            id: raw.id,
            number: raw.incident_number,
            status: raw.status,
            created_at,
            service,
            summary: raw.summary.unwrap_or_else(|| NO_SUMMARY.to_string()),
            assignee,
            priority: raw.priority.is_some_and(|p| !p.is_null()),
        })
    }
}

/// Body of `PUT /incidents/{id}`.
#[derive(Debug, Serialize)]
pub struct UpdateIncidentRequest {
    pub incident: IncidentUpdate,
}

#[derive(Debug, Serialize)]
pub struct IncidentUpdate {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub status: IncidentStatus,
}

impl UpdateIncidentRequest {
    /// Transition to acknowledged using an `incident_reference` payload.
    pub fn acknowledge() -> Self {
        Self {
            incident: IncidentUpdate {
                kind: "incident_reference",
                status: IncidentStatus::Acknowledged,
            },
        }
    }
}
