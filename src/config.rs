//! Application configuration
//!
//! Settings are read from an optional YAML file. Every field has a
//! default, so an empty file (or no file) is a valid configuration.
//! Credentials from the file are overlaid by the `SALESFORCE_*`
//! environment variables.

use crate::auth::Credentials;
use crate::client::SalesforceClientConfig;
use crate::error::{Error, Result};
use crate::types::{ColumnDelimiter, LineEnding};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// REST/Bulk API version without the `v`
    pub api_version: String,

    /// Host used for the SOAP login call
    pub login_url: String,

    /// Root directory for materialized results
    pub output_root: PathBuf,

    /// HTTP client settings
    pub http: HttpSettings,

    /// Bulk job settings
    pub bulk: BulkSettings,

    /// Credentials; environment variables take precedence
    #[serde(skip_serializing)]
    pub credentials: Credentials,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            login_url: default_login_url(),
            output_root: PathBuf::from("results"),
            http: HttpSettings::default(),
            bulk: BulkSettings::default(),
            credentials: Credentials::default(),
        }
    }
}

fn default_api_version() -> String {
    "59.0".to_string()
}

fn default_login_url() -> String {
    "https://login.salesforce.com".to_string()
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 120,
        }
    }
}

// ============================================================================
// Bulk Settings
// ============================================================================

/// Bulk job polling and result paging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkSettings {
    /// Seconds between job status checks
    pub poll_interval_seconds: u64,

    /// Status checks before giving up on a job
    pub max_poll_attempts: u32,

    /// Page size for Bulk API 2.0 results
    pub max_records: u32,

    /// Column delimiter for Bulk API 2.0 results
    pub column_delimiter: ColumnDelimiter,

    /// Line ending for Bulk API 2.0 results
    pub line_ending: LineEnding,
}

impl Default for BulkSettings {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 10,
            max_poll_attempts: 60,
            max_records: 100_000,
            column_delimiter: ColumnDelimiter::Comma,
            line_ending: LineEnding::Lf,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl AppConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_yaml(&content)
    }

    /// Load `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject values that would make every remote call fail
    pub fn validate(&self) -> Result<()> {
        if self.api_version.trim().is_empty() {
            return Err(Error::invalid_value("api_version", "must not be empty"));
        }
        if self.api_version.starts_with('v') {
            return Err(Error::invalid_value(
                "api_version",
                "give the bare version, e.g. 59.0",
            ));
        }
        url::Url::parse(&self.login_url)
            .map_err(|e| Error::invalid_value("login_url", e.to_string()))?;
        if self.http.timeout_seconds == 0 {
            return Err(Error::invalid_value("http.timeout_seconds", "must be > 0"));
        }
        if self.bulk.max_poll_attempts == 0 {
            return Err(Error::invalid_value("bulk.max_poll_attempts", "must be > 0"));
        }
        if self.bulk.max_records == 0 {
            return Err(Error::invalid_value("bulk.max_records", "must be > 0"));
        }
        Ok(())
    }

    /// File credentials overlaid by the environment
    pub fn credentials(&self) -> Result<Credentials> {
        self.credentials_with(|key| std::env::var(key).ok())
    }

    /// File credentials overlaid by `lookup`
    pub fn credentials_with<F>(&self, lookup: F) -> Result<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.credentials.clone().overlay(lookup)
    }

    /// Per-request HTTP timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Settings for the remote query client
    pub fn client_config(&self) -> SalesforceClientConfig {
        SalesforceClientConfig {
            api_version: self.api_version.clone(),
            poll_interval: Duration::from_secs(self.bulk.poll_interval_seconds),
            max_poll_attempts: self.bulk.max_poll_attempts,
        }
    }
}
