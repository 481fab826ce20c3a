//! Remote query client types
//!
//! Shapes exchanged across the remote query boundary.

use crate::error::Result;
use crate::types::Record;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};

/// Lazy, forward-only stream of delimited-text result pages
pub type PageStream = BoxStream<'static, Result<String>>;

/// Result of a retrieval call
pub enum RetrievalResult {
    /// Records already held in memory
    Records(Vec<Record>),
    /// Result pages fetched one at a time as the stream is polled
    Pages(PageStream),
}

impl RetrievalResult {
    /// Wrap already-fetched pages as a stream (handy for fixtures)
    pub fn from_pages<I>(pages: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        RetrievalResult::Pages(stream::iter(pages.into_iter().map(Ok)).boxed())
    }

    /// Whether this is the in-memory variant
    pub fn is_in_memory(&self) -> bool {
        matches!(self, RetrievalResult::Records(_))
    }
}

impl std::fmt::Debug for RetrievalResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrievalResult::Records(records) => f
                .debug_tuple("Records")
                .field(&records.len())
                .finish(),
            RetrievalResult::Pages(_) => f.write_str("Pages(..)"),
        }
    }
}

/// Schema metadata for one remote object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// API name
    pub name: String,
    /// Display label
    pub label: String,
    /// Fields in describe order
    pub fields: Vec<FieldDescriptor>,
}

impl ObjectDescriptor {
    /// Field API names in describe order
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

/// One field from a describe response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// API name
    pub name: String,
    /// Display label
    #[serde(default)]
    pub label: Option<String>,
    /// Salesforce field type (`id`, `string`, `address`, ...)
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
}

/// Response of the "updated records" call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedRecords {
    /// Ids of records changed in the window
    #[serde(default)]
    pub ids: Vec<String>,
    /// Last timestamp the server's answer covers
    #[serde(default)]
    pub latest_date_covered: Option<String>,
}
