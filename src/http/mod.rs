//! HTTP client module
//!
//! Thin wrapper over reqwest shared by the auth and remote query layers.
//!
//! # Features
//!
//! - **Base URL resolution**: relative paths resolve against the instance URL
//! - **Session handling**: bearer or `X-SFDC-Session` per request
//! - **Error classification**: non-success statuses become typed errors

mod client;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestBody, RequestConfig,
    SessionHeader,
};
