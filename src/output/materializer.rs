//! Result materializer
//!
//! Turns a [`RetrievalResult`] into the JSON/CSV file pair.

use super::writer::{PairWriter, WriteSummary};
use crate::client::RetrievalResult;
use crate::decode::{CsvDecoder, RecordDecoder};
use crate::error::Result;
use futures::StreamExt;
use std::path::Path;
use tracing::{debug, info};

/// Writes retrieval results to disk
pub struct ResultMaterializer {
    decoder: Box<dyn RecordDecoder>,
}

impl ResultMaterializer {
    /// Materializer that parses pages as comma-separated text
    pub fn new() -> Self {
        Self::with_decoder(CsvDecoder::new())
    }

    /// Materializer with a custom page decoder
    pub fn with_decoder(decoder: impl RecordDecoder + 'static) -> Self {
        Self {
            decoder: Box::new(decoder),
        }
    }

    /// Write `result` to `<dir>/<name>.json` and `<dir>/<name>.csv`.
    ///
    /// Existing files of the same name are replaced. Pages are consumed in
    /// order; the CSV header comes from the first record overall and is not
    /// re-derived for later pages. A failure leaves whatever was already
    /// written on disk.
    pub async fn write(
        &self,
        result: RetrievalResult,
        dir: impl AsRef<Path>,
        name: &str,
    ) -> Result<WriteSummary> {
        let mut writer = PairWriter::create(dir, name)?;

        let pages = match result {
            RetrievalResult::Records(records) => {
                for record in &records {
                    writer.write_record(record)?;
                }
                1
            }
            RetrievalResult::Pages(mut pages) => {
                let mut count = 0;
                while let Some(page) = pages.next().await {
                    let rows = self.decoder.decode(&page?)?;
                    count += 1;
                    debug!("Page {count}: {} rows", rows.len());
                    for row in &rows {
                        writer.write_record(row)?;
                    }
                }
                count
            }
        };

        let summary = writer.finish(pages)?;
        info!(
            "Wrote {} records ({} pages) to {}",
            summary.records,
            summary.pages,
            summary.paths.csv.display()
        );
        Ok(summary)
    }
}

impl Default for ResultMaterializer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResultMaterializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultMaterializer").finish_non_exhaustive()
    }
}
