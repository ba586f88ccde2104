//! # pdack-config
//!
//! Loads `~/.config/pagerduty_tui.yaml`:
//!
//! ```yaml
//! pagerduty_api_key: <your-api-key>
//! pagerduty_domain: <your-org>
//! # optional
//! api_base_url: https://api.pagerduty.com
//! timeout_secs: 30
//! ```
//!
//! The file is read once at startup. A missing file or key is fatal.

use std::path::{Path, PathBuf};

use pdack_api::ClientConfig;
use pdack_api::client::{DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECS};
use pdack_core::{PdackError, Result};
use serde::Deserialize;
use tracing::debug;

/// Config file location relative to the home directory.
pub const CONFIG_RELATIVE_PATH: &str = ".config/pagerduty_tui.yaml";

/// Default config file path (`~/.config/pagerduty_tui.yaml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_RELATIVE_PATH))
}

/// pdack configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    /// PagerDuty REST API key
    #[serde(default)]
    pub pagerduty_api_key: Option<String>,

    /// Organisation subdomain, used for dashboard links
    #[serde(default)]
    pub pagerduty_domain: Option<String>,

    /// API base URL override
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Config {
    /// Load and validate the config from `path`, or from the default path.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()
                .ok_or_else(|| PdackError::config_not_found(CONFIG_RELATIVE_PATH))?,
        };

        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PdackError::config_not_found_with_source(&path, e),
            _ => PdackError::io("reading config", &path, e),
        })?;

        let config = Self::parse(&content, &path)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse configuration from a YAML string. `path` is used for errors only.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        // An empty file parses to unit, not to a mapping
        if content.trim().is_empty() {
            return Err(PdackError::missing_field("pagerduty_api_key"));
        }

        serde_yaml::from_str(content).map_err(|e| PdackError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.api_key().is_empty() {
            return Err(PdackError::missing_field("pagerduty_api_key"));
        }

        if self.timeout_secs == 0 {
            return Err(PdackError::ConfigValidation {
                message: "timeout_secs must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// The API key, trimmed. Empty when not configured.
    pub fn api_key(&self) -> &str {
        self.pagerduty_api_key.as_deref().unwrap_or_default().trim()
    }

    /// Dashboard link for an incident, when a domain is configured.
    pub fn incident_url(&self, incident_id: &str) -> Option<String> {
        self.pagerduty_domain
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(|domain| format!("https://{}.pagerduty.com/incidents/{}", domain.trim(), incident_id))
    }

    /// HTTP client settings derived from this config.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(self.api_base_url.clone())
            .with_timeout_secs(self.timeout_secs)
    }
}
