//! PagerDuty REST client using reqwest.
//!
//! ## Example
//!
//! ```no_run
//! use pdack_api::{ClientConfig, IncidentApi, PagerDutyClient, Session};
//! use pdack_core::IncidentStatus;
//!
//! # async fn example() -> Result<(), pdack_api::ApiError> {
//! let client = PagerDutyClient::new("u+abcdef", ClientConfig::default())?;
//! let session = Session::resolve(&client).await?;
//!
//! let incidents = client
//!     .fetch_incidents(session.user_id(), &[IncidentStatus::Triggered])
//!     .await?;
//! for incident in &incidents {
//!     client.acknowledge_incident(&incident.id).await?;
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use pdack_core::{Incident, IncidentStatus, UserId};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use tokio::time::Duration;
use tracing::{debug, warn};

use crate::api::IncidentApi;
use crate::api_types::{IncidentsEnvelope, UpdateIncidentRequest, UserEnvelope};
use crate::error::{ApiError, Result};

/// Public PagerDuty REST endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.pagerduty.com";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size for incident listings. Only the first page is read.
pub const INCIDENT_PAGE_LIMIT: u32 = 100;

/// Connection settings for [`PagerDutyClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, without trailing slash
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Set custom API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Authenticated PagerDuty client.
///
/// Holds the API key for the process lifetime; it never changes after
/// construction.
pub struct PagerDutyClient {
    client: reqwest::Client,
    api_key: String,
    config: ClientConfig,
}

impl std::fmt::Debug for PagerDutyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerDutyClient")
            .field("api_key", &"<redacted>")
            .field("config", &self.config)
            .finish()
    }
}

impl PagerDutyClient {
    /// Create a client for the given API key.
    pub fn new(api_key: impl Into<String>, config: ClientConfig) -> Result<Self> {
        // Timeout applies to every request, connect included
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Client(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Attach the PagerDuty headers to a request.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Token token={}", self.api_key))
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, self.config.timeout_secs))
    }

    async fn read_json<T: serde::de::DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| ApiError::from_reqwest(e, self.config.timeout_secs))
    }

    async fn fetch_status(&self, user_id: &str, status: &str) -> Result<Vec<Incident>> {
        debug!(status, user_id, "fetching incidents");

        // First page only; `more` is reported below
        let limit = INCIDENT_PAGE_LIMIT.to_string();
        let request = self.client.get(self.url("/incidents")).query(&[
            ("statuses[]", status),
            ("user_ids[]", user_id),
            ("limit", limit.as_str()),
        ]);
        let response = self.send(request).await?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status_code,
                body,
            });
        }

        // Parse response
        let envelope: IncidentsEnvelope = self.read_json(response).await?;
        if envelope.more {
            warn!(
                status,
                limit = INCIDENT_PAGE_LIMIT,
                "more incidents exist than one page; only the first page is read"
            );
        }

        envelope
            .incidents
            .into_iter()
            .map(Incident::try_from)
            .collect()
    }
}

#[async_trait]
impl IncidentApi for PagerDutyClient {
    async fn current_user(&self) -> Result<UserId> {
        let response = self.send(self.client.get(self.url("/users/me"))).await?;

        // Any rejection here means the key is unusable
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Auth { status, body });
        }

        let envelope: UserEnvelope = self.read_json(response).await?;
        Ok(envelope.user.id)
    }

    async fn fetch_incidents(
        &self,
        user_id: &str,
        statuses: &[IncidentStatus],
    ) -> Result<Vec<Incident>> {
        let mut incidents = Vec::new();
        for status in statuses {
            let Some(query) = status.as_query() else {
                debug!(%status, "status has no query form, skipping");
                continue;
            };
            incidents.extend(self.fetch_status(user_id, query).await?);
        }
        Ok(incidents)
    }

    async fn acknowledge_incident(&self, incident_id: &str) -> Result<bool> {
        let request = self
            .client
            .put(self.url(&format!("/incidents/{}", incident_id)))
            .json(&UpdateIncidentRequest::acknowledge());
        let response = self.send(request).await?;

        // Only 200 counts as acknowledged
        let status = response.status();
        if status == StatusCode::OK {
            debug!(incident_id, "incident acknowledged");
            return Ok(true);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(incident_id, status = status.as_u16(), body = %body, "acknowledge rejected");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.pagerduty.com");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_client_config_trims_trailing_slash() {
        let config = ClientConfig::default()
            .with_base_url("http://127.0.0.1:8080/")
            .with_timeout_secs(5);
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = PagerDutyClient::new("secret-key", ClientConfig::default()).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
