//! Result page decoder module
//!
//! Bulk query results arrive as delimited text with a header row. The
//! decoders here turn one such page into ordered records.

mod decoders;
mod types;

pub use decoders::CsvDecoder;
pub use types::RecordDecoder;

#[cfg(test)]
mod tests;
