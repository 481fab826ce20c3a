//! Authenticator implementation
//!
//! Handles applying the session to requests and managing session refresh.

use super::types::{AuthConfig, CachedToken};
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Header carrying the session id on Bulk API 1.0 requests
pub const BULK_SESSION_HEADER: &str = "X-SFDC-Session";

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached session for login-based auth
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for login requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Apply the session as a bearer token (REST and Bulk API 2.0)
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match self.session_id().await? {
            Some(session) => Ok(req.bearer_auth(session)),
            None => Ok(req),
        }
    }

    /// Apply the session as `X-SFDC-Session` (Bulk API 1.0)
    pub async fn apply_bulk(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match self.session_id().await? {
            Some(session) => Ok(req.header(BULK_SESSION_HEADER, session)),
            None => Ok(req),
        }
    }

    /// Current session id, logging in if needed. `None` when auth is disabled.
    pub async fn session_id(&self) -> Result<Option<String>> {
        match &self.config {
            AuthConfig::None => Ok(None),
            AuthConfig::Session { session_id } => Ok(Some(session_id.clone())),
            AuthConfig::SoapLogin { .. } => self.get_or_refresh_token().await.map(Some),
        }
    }

    /// Get a valid session, logging in again if necessary
    async fn get_or_refresh_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have logged in while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.login().await?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    /// Perform the SOAP login call
    async fn login(&self) -> Result<CachedToken> {
        let AuthConfig::SoapLogin {
            login_url,
            api_version,
            username,
            password,
            security_token,
        } = &self.config
        else {
            return Err(Error::auth("Login not supported for this auth type"));
        };

        let url = format!(
            "{}/services/Soap/u/{}",
            login_url.trim_end_matches('/'),
            api_version
        );
        info!("Logging in as {username}");
        debug!("SOAP login endpoint: {url}");

        let envelope = login_envelope(username, &format!("{password}{security_token}"));
        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "text/xml; charset=UTF-8")
            .header("SOAPAction", "login")
            .body(envelope)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            let reason = extract_xml_tag(&body, "faultstring")
                .unwrap_or_else(|| format!("login returned status {}", status.as_u16()));
            return Err(Error::auth(reason));
        }

        let session_id = extract_xml_tag(&body, "sessionId")
            .ok_or_else(|| Error::auth("Login response did not contain a sessionId"))?;

        Ok(match extract_xml_tag(&body, "sessionSecondsValid")
            .and_then(|v| v.parse::<i64>().ok())
        {
            Some(secs) => CachedToken::expires_in(session_id, secs),
            None => CachedToken::new(session_id, None),
        })
    }

    /// Clear the cached session (forces a new login on next use)
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.config {
            AuthConfig::None => "none",
            AuthConfig::Session { .. } => "session",
            AuthConfig::SoapLogin { .. } => "soap_login",
        };
        f.debug_struct("Authenticator")
            .field("kind", &kind)
            .finish_non_exhaustive()
    }
}

/// Build the partner SOAP login envelope
fn login_envelope(username: &str, password: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8" ?>
<env:Envelope xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:env="http://schemas.xmlsoap.org/soap/envelope/" xmlns:urn="urn:partner.soap.sforce.com">
  <env:Header>
    <urn:CallOptions>
      <urn:client>crm-extract</urn:client>
    </urn:CallOptions>
  </env:Header>
  <env:Body>
    <n1:login xmlns:n1="urn:partner.soap.sforce.com">
      <n1:username>{}</n1:username>
      <n1:password>{}</n1:password>
    </n1:login>
  </env:Body>
</env:Envelope>"#,
        xml_escape(username),
        xml_escape(password)
    )
}

/// Escape text for inclusion in an XML element
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Extract the text of the first `<tag>...</tag>` element.
/// Supports plain and namespace-prefixed tags like `sf:tag`.
pub fn extract_xml_tag(body: &str, tag: &str) -> Option<String> {
    find_element(body, tag).map(|(text, _)| text)
}

/// Extract the text of every `<tag>...</tag>` element, in document order
pub fn extract_xml_tags(body: &str, tag: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut offset = 0;
    while let Some((text, end)) = find_element(&body[offset..], tag) {
        found.push(text);
        offset += end;
    }
    found
}

/// Text of the first matching element and the byte offset just past its close tag
fn find_element(body: &str, tag: &str) -> Option<(String, usize)> {
    let mut search = 0;
    while let Some(rel) = body[search..].find('<') {
        let open_start = search + rel;
        let open_end = open_start + body[open_start..].find('>')?;
        let inner = &body[open_start + 1..open_end];
        let self_closing = inner.ends_with('/');
        let name = inner
            .trim_end_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or_default();
        let local = name.rsplit(':').next().unwrap_or(name);

        if local == tag && !name.starts_with('/') {
            // `<tag/>` and `<tag xsi:nil="true"/>` have no text
            if self_closing {
                return Some((String::new(), open_end + 1));
            }
            let close = format!("</{name}>");
            let content_start = open_end + 1;
            let content_end = content_start + body[content_start..].find(&close)?;
            let text = xml_unescape(&body[content_start..content_end]);
            return Some((text, content_end + close.len()));
        }
        search = open_end + 1;
    }
    None
}

/// Decode the predefined entities and numeric character references.
/// Anything unrecognised is kept as written.
fn xml_unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').and_then(|semi| Some((decode_entity(&tail[1..semi])?, semi))) {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}
