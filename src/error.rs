//! Error types for crm-extract
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for crm-extract
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Remote Query Errors
    // ============================================================================
    #[error("Describe failed for object '{object}': {message}")]
    Describe { object: String, message: String },

    #[error("Bulk job {job_id} {state}: {message}")]
    BulkJob {
        job_id: String,
        state: String,
        message: String,
    },

    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("CSV parsing error: {message}")]
    CsvParse { message: String },

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a bulk job error
    pub fn bulk_job(
        job_id: impl Into<String>,
        state: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::BulkJob {
            job_id: job_id.into(),
            state: state.into(),
            message: message.into(),
        }
    }

    /// Create an unexpected response error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            message: message.into(),
        }
    }

    /// Create a CSV parse error
    pub fn csv(message: impl Into<String>) -> Self {
        Self::CsvParse {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Whether the failure came from the remote service rather than local code
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Auth { .. }
                | Error::Http(_)
                | Error::HttpStatus { .. }
                | Error::Timeout { .. }
                | Error::Describe { .. }
                | Error::BulkJob { .. }
                | Error::UnexpectedResponse { .. }
        )
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(_) => Error::Output {
                message: err.to_string(),
            },
            _ => Error::CsvParse {
                message: err.to_string(),
            },
        }
    }
}

/// Result type alias for crm-extract
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("SALESFORCE_TOKEN");
        assert_eq!(
            err.to_string(),
            "Missing required config field: SALESFORCE_TOKEN"
        );

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::bulk_job("750xx", "Failed", "InvalidBatch");
        assert_eq!(err.to_string(), "Bulk job 750xx Failed: InvalidBatch");
    }

    #[test]
    fn test_is_remote() {
        assert!(Error::auth("bad password").is_remote());
        assert!(Error::http_status(500, "").is_remote());
        assert!(Error::bulk_job("1", "Aborted", "").is_remote());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_remote());

        assert!(!Error::config("test").is_remote());
        assert!(!Error::csv("bad row").is_remote());
        assert!(!Error::output("disk full").is_remote());
    }

    #[test]
    fn test_csv_error_conversion() {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader("a,b\n1,2,3\n".as_bytes());
        let err = reader
            .records()
            .next()
            .and_then(std::result::Result::err)
            .map(Error::from);
        assert!(matches!(err, Some(Error::CsvParse { .. })));
    }
}
