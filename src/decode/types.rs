//! Decoder traits
//!
//! Defines the core decoder abstraction.

use crate::error::Result;
use crate::types::Record;

/// Trait for decoding a result page into records
pub trait RecordDecoder: Send + Sync {
    /// Decode one page body into records, in row order
    fn decode(&self, body: &str) -> Result<Vec<Record>>;
}
