// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # crm-extract
//!
//! Schema-aware export of Salesforce objects to local JSON and CSV files.
//!
//! ## Features
//!
//! - **SOQL construction**: field lists, `IN (...)` filters, last-modified windows
//! - **Bulk queries**: Bulk API 1.0 and 2.0 jobs with lazy result paging
//! - **Paired output**: newline-delimited pretty JSON next to a CSV with a BOM
//! - **Date presets**: named windows such as `last_7d` fixed at startup
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crm_extract::{AppConfig, Connector, RecordRequest, Result};
//! use crm_extract::presets::DatePreset;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let connector = Connector::from_config(AppConfig::default())?;
//!     let accessor = connector.accessor("Case").await?;
//!
//!     // results/Case/by_date/from_<start>_to_<end>_data.{json,csv}
//!     let request = RecordRequest::new().with_preset(DatePreset::Last7d);
//!     let summary = accessor.get_records(&request).await?;
//!     println!("{} records in {}", summary.records, summary.paths.csv.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      RecordAccessor                        │
//! │  get_records → get_all_records (bulk v2) | query_filtered  │
//! └────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────┬─────────────┬────┴────────┬──────────┬──────────┐
//! │  Query   │   Client    │   Decode    │  Output  │ Presets  │
//! ├──────────┼─────────────┼─────────────┼──────────┼──────────┤
//! │ SELECT   │ describe    │ CSV pages   │ JSON     │ last_30d │
//! │ IN (...) │ REST query  │             │ CSV+BOM  │ last_7d  │
//! │ window   │ bulk v1/v2  │             │          │ ...      │
//! └──────────┴──────┬──────┴─────────────┴──────────┴──────────┘
//!                   │
//!        Connector → HttpClient → Authenticator (SOAP login)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: document error variants and the remaining enum members

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication (SOAP login, session ids)
pub mod auth;

/// HTTP client with session handling
pub mod http;

/// Remote query client
pub mod client;

/// Shared, lazily opened connection
pub mod connector;

/// Named date windows
pub mod presets;

/// SOQL construction
pub mod query;

/// Result page decoders (CSV)
pub mod decode;

/// JSON/CSV file output
pub mod output;

/// Per-object record access
pub mod accessor;

/// Application configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use accessor::{RecordAccessor, RecordRequest};
pub use client::{QueryClient, RetrievalResult, SalesforceClient};
pub use config::AppConfig;
pub use connector::Connector;
pub use output::{ResultMaterializer, WriteSummary};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
