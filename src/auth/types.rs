//! Auth configuration types
//!
//! Credentials as supplied by the environment or config file, and the
//! runtime auth configuration derived from them.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Environment variable holding the account user name
pub const ENV_USERNAME: &str = "SALESFORCE_USERNAME";
/// Environment variable holding the account password
pub const ENV_PASSWORD: &str = "SALESFORCE_PASSWORD";
/// Environment variable holding the security token
pub const ENV_TOKEN: &str = "SALESFORCE_TOKEN";
/// Environment variable holding the instance endpoint
pub const ENV_INSTANCE: &str = "SALESFORCE_INSTANCE";

/// Four opaque secrets used to open a session.
///
/// Nothing in the crate inspects these beyond passing them to the login call.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Account identifier
    pub username: String,
    /// Account secret
    pub password: String,
    /// Security token appended to the password on login
    pub security_token: String,
    /// Instance endpoint, e.g. `https://yourcompany.my.salesforce.com`
    pub instance_url: String,
}

impl Credentials {
    /// Create credentials from explicit values
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        security_token: impl Into<String>,
        instance_url: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            security_token: security_token.into(),
            instance_url: instance_url.into(),
        }
    }

    /// Read credentials from the `SALESFORCE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Fill values from `lookup`, keeping the current value where the lookup has none.
    ///
    /// Fails if any of the four ends up empty.
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let slots = [
            (ENV_USERNAME, &mut self.username),
            (ENV_PASSWORD, &mut self.password),
            (ENV_TOKEN, &mut self.security_token),
            (ENV_INSTANCE, &mut self.instance_url),
        ];
        for (key, slot) in slots {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = value;
            }
            if slot.is_empty() {
                return Err(Error::missing_field(key));
            }
        }
        Ok(self)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("security_token", &"<redacted>")
            .field("instance_url", &self.instance_url)
            .finish()
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// No authentication (local testing)
    #[default]
    None,

    /// Pre-issued session id
    Session {
        /// The session id, sent as bearer token or `X-SFDC-Session`
        session_id: String,
    },

    /// SOAP `login` call with user name and password + security token
    SoapLogin {
        /// Login host, e.g. `https://login.salesforce.com`
        login_url: String,
        /// API version used for the SOAP endpoint
        api_version: String,
        /// User name
        username: String,
        /// Password (without token)
        password: String,
        /// Security token
        security_token: String,
    },
}

impl AuthConfig {
    /// Build a SOAP login config from credentials
    pub fn soap_login(
        credentials: &Credentials,
        login_url: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        AuthConfig::SoapLogin {
            login_url: login_url.into(),
            api_version: api_version.into(),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            security_token: credentials.security_token.clone(),
        }
    }
}

/// Cached session with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The session id
    pub token: String,
    /// When the session expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false,
        }
    }
}
