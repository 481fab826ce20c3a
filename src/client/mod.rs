//! Remote query client
//!
//! The [`QueryClient`] trait is the boundary to the remote CRM service:
//! object describe, REST query, the two bulk query flavors and the
//! "updated records" call. [`SalesforceClient`] implements it over HTTP.
//!
//! Bulk calls hand back a [`PageStream`]: each item is one page of
//! delimited text, fetched when the stream is polled.

mod bulk;
mod salesforce;
mod types;

pub use bulk::{parse_job_status, parse_result_ids, JobState, JobStatus};
pub use salesforce::{SalesforceClient, SalesforceClientConfig, LOCATOR_HEADER};
pub use types::{
    FieldDescriptor, ObjectDescriptor, PageStream, RetrievalResult, UpdatedRecords,
};

use crate::error::Result;
use crate::types::{ColumnDelimiter, LineEnding, Record};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Operations the record accessor needs from the remote service
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Schema metadata for `object`
    async fn describe(&self, object: &str) -> Result<ObjectDescriptor>;

    /// Run a SOQL query through the REST API and collect every record
    async fn query(&self, soql: &str) -> Result<Vec<Record>>;

    /// Run a SOQL query as a Bulk API 1.0 job
    async fn bulk_query(&self, object: &str, soql: &str) -> Result<PageStream>;

    /// Run a SOQL query as a Bulk API 2.0 job
    async fn bulk_query_v2(
        &self,
        soql: &str,
        max_records: u32,
        column_delimiter: ColumnDelimiter,
        line_ending: LineEnding,
    ) -> Result<PageStream>;

    /// Ids of `object` records changed between `start` and `end`
    async fn updated_records(
        &self,
        object: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<UpdatedRecords>;
}
