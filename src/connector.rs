//! Connection to the remote service
//!
//! A [`Connector`] owns the settings needed to open a session and creates
//! the [`SalesforceClient`] on first use. Later callers, including
//! concurrent ones, share that same client.

use crate::accessor::RecordAccessor;
use crate::auth::{AuthConfig, Credentials};
use crate::client::{QueryClient, SalesforceClient};
use crate::config::AppConfig;
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Lazily connected, shared remote client
pub struct Connector {
    config: AppConfig,
    instance_url: String,
    auth: AuthConfig,
    client: OnceCell<Arc<SalesforceClient>>,
}

impl Connector {
    /// Connector that logs in with `credentials` on first use
    pub fn new(config: AppConfig, credentials: &Credentials) -> Self {
        let auth = AuthConfig::soap_login(credentials, &config.login_url, &config.api_version);
        Self::with_auth(config, credentials.instance_url.clone(), auth)
    }

    /// Connector with an explicit auth configuration
    pub fn with_auth(config: AppConfig, instance_url: impl Into<String>, auth: AuthConfig) -> Self {
        Self {
            config,
            instance_url: instance_url.into(),
            auth,
            client: OnceCell::new(),
        }
    }

    /// Connector using the config file credentials overlaid by the environment
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let credentials = config.credentials()?;
        Ok(Self::new(config, &credentials))
    }

    /// Shared client, logging in on the first call
    pub async fn client(&self) -> Result<Arc<SalesforceClient>> {
        self.client
            .get_or_try_init(|| self.connect())
            .await
            .map(Arc::clone)
    }

    /// Whether the session has been opened
    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    /// Settings in use
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Accessor for `object` sharing this connector's client
    pub async fn accessor(&self, object: &str) -> Result<RecordAccessor> {
        let client: Arc<dyn QueryClient> = self.client().await?;
        let accessor = RecordAccessor::new(client, object, &self.config.output_root).await?;
        Ok(accessor.with_bulk_settings(self.config.bulk.clone()))
    }

    async fn connect(&self) -> Result<Arc<SalesforceClient>> {
        let http_config = HttpClientConfig::builder()
            .base_url(&self.instance_url)
            .timeout(self.config.timeout())
            .build();
        let http = HttpClient::with_auth(http_config, self.auth.clone())?;

        // Open the session now so bad credentials fail here
        if let Some(auth) = http.authenticator() {
            auth.session_id().await?;
        }
        info!("Connected to {}", self.instance_url);

        Ok(Arc::new(SalesforceClient::new(
            http,
            self.config.client_config(),
        )))
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("instance_url", &self.instance_url)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn login_body(session: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <loginResponse>
      <result>
        <sessionId>{session}</sessionId>
        <sessionSecondsValid>7200</sessionSecondsValid>
      </result>
    </loginResponse>
  </soapenv:Body>
</soapenv:Envelope>"#
        )
    }

    fn connector_for(server: &MockServer) -> Connector {
        let config = AppConfig {
            login_url: server.uri(),
            ..AppConfig::default()
        };
        let credentials = Credentials::new("user@example.com", "pw", "tok", server.uri());
        Connector::new(config, &credentials)
    }

    #[tokio::test]
    async fn test_session_opened_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/Soap/u/59.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(login_body("00Dsess")))
            .expect(1)
            .mount(&server)
            .await;

        let connector = connector_for(&server);
        assert!(!connector.is_connected());

        let (a, b) = tokio::join!(connector.client(), connector.client());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(connector.is_connected());

        let c = connector.client().await.unwrap();
        assert!(Arc::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn test_login_failure_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/Soap/u/59.0"))
            .respond_with(ResponseTemplate::new(500).set_body_string(
                "<soapenv:Envelope><soapenv:Body><soapenv:Fault>\
                 <faultstring>INVALID_LOGIN: Invalid username, password, security token</faultstring>\
                 </soapenv:Fault></soapenv:Body></soapenv:Envelope>",
            ))
            .mount(&server)
            .await;

        let connector = connector_for(&server);
        let err = connector.client().await.unwrap_err();
        assert!(matches!(err, Error::Auth { ref message } if message.contains("INVALID_LOGIN")));
        assert!(!connector.is_connected());
    }

    #[tokio::test]
    async fn test_accessor_shares_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v59.0/sobjects/Case/describe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Case",
                "label": "Case",
                "fields": [{"name": "Id"}, {"name": "Subject"}]
            })))
            .mount(&server)
            .await;

        let connector = Connector::with_auth(
            AppConfig::default(),
            server.uri(),
            AuthConfig::Session {
                session_id: "sess".to_string(),
            },
        );
        let accessor = connector.accessor("Case").await.unwrap();
        assert_eq!(accessor.fields(), ["Id", "Subject"]);
        assert!(connector.is_connected());
    }
}
