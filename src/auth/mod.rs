//! Authentication module
//!
//! Supports: SOAP user name/password login and pre-issued session ids.
//!
//! The `Authenticator` applies the session to outgoing requests and
//! re-runs the login when the cached session is about to expire.

mod authenticator;
mod types;

pub use authenticator::{
    extract_xml_tag, extract_xml_tags, xml_escape, Authenticator, BULK_SESSION_HEADER,
};
pub use types::{
    AuthConfig, CachedToken, Credentials, ENV_INSTANCE, ENV_PASSWORD, ENV_TOKEN, ENV_USERNAME,
};
