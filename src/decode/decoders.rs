//! Decoder implementations

use super::types::RecordDecoder;
use crate::error::{Error, Result};
use crate::types::{ColumnDelimiter, JsonValue, Record};

/// Delimited-text decoder. The first row is the header.
///
/// Every cell becomes a JSON string; no type inference is applied.
/// Rows whose width differs from the header are a parse error.
#[derive(Debug, Clone, Copy)]
pub struct CsvDecoder {
    /// Field delimiter
    delimiter: u8,
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvDecoder {
    /// Create a new comma-separated decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder for a Bulk API column delimiter
    pub fn with_delimiter(delimiter: ColumnDelimiter) -> Self {
        Self {
            delimiter: delimiter.as_byte(),
        }
    }

    /// The delimiter byte in use
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

impl RecordDecoder for CsvDecoder {
    fn decode(&self, body: &str) -> Result<Vec<Record>> {
        let body = body.strip_prefix('\u{feff}').unwrap_or(body);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(body.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| Error::csv(format!("Failed to read header row: {e}")))?
            .clone();

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row.map_err(|e| Error::csv(format!("Failed to parse row {}: {e}", index + 1)))?;

            let mut record = Record::new();
            for (name, value) in headers.iter().zip(row.iter()) {
                record.insert(name.to_string(), JsonValue::String(value.to_string()));
            }
            records.push(record);
        }

        Ok(records)
    }
}
