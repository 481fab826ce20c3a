//! Output module
//!
//! Materializes retrieval results as two sibling files.
//!
//! # Overview
//!
//! - `<name>.json`: one pretty-printed JSON object per record, newline separated
//! - `<name>.csv`: header from the first record, then one row per record
//!
//! Both files start with a UTF-8 byte-order mark and are replaced on every
//! write operation.

mod materializer;
mod writer;

pub use materializer::ResultMaterializer;
pub use writer::{csv_cell, write_records, OutputPaths, PairWriter, WriteSummary, UTF8_BOM};

#[cfg(test)]
mod tests;
