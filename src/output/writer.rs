//! Paired JSON/CSV file writer
//!
//! Writes the same records to `<name>.json` (newline-delimited, pretty
//! printed) and `<name>.csv` (header from the first record).

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// UTF-8 byte-order mark written before the first record of each file
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// JSON indentation used for each record
const JSON_INDENT: &[u8] = b"    ";

/// Paths of the two sibling output files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPaths {
    /// Newline-delimited JSON file
    pub json: PathBuf,
    /// CSV file
    pub csv: PathBuf,
}

impl OutputPaths {
    /// `<dir>/<name>.json` and `<dir>/<name>.csv`
    pub fn new(dir: impl AsRef<Path>, name: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            json: dir.join(format!("{name}.json")),
            csv: dir.join(format!("{name}.csv")),
        }
    }
}

/// Outcome of one write operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// Files written
    pub paths: OutputPaths,
    /// Records written to each file
    pub records: usize,
    /// Pages consumed (1 for in-memory results)
    pub pages: usize,
}

/// Writer holding both output files open for one write operation.
///
/// Files close when the writer is dropped, including on error paths.
/// Nothing is rolled back: rows written before a failure stay on disk.
pub struct PairWriter {
    paths: OutputPaths,
    json: BufWriter<File>,
    csv: csv::Writer<File>,
    header: Option<Vec<String>>,
    records: usize,
    bom_written: bool,
    warned_extra_keys: bool,
}

impl PairWriter {
    /// Create `dir` if needed, delete any existing output files, and open both for append
    pub fn create(dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| {
            Error::output(format!("Failed to create directory {}: {e}", dir.display()))
        })?;

        let paths = OutputPaths::new(dir, name);
        remove_existing(&paths.json)?;
        remove_existing(&paths.csv)?;

        let json = BufWriter::new(open_append(&paths.json)?);
        let csv = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(open_append(&paths.csv)?);

        debug!("Opened {} and {}", paths.json.display(), paths.csv.display());

        Ok(Self {
            paths,
            json,
            csv,
            header: None,
            records: 0,
            bom_written: false,
            warned_extra_keys: false,
        })
    }

    /// Append one record to both files
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        // Empty results leave zero-length files
        if !self.bom_written {
            self.json.write_all(UTF8_BOM)?;
            (&mut self.csv.get_ref()).write_all(UTF8_BOM)?;
            self.bom_written = true;
        }
        self.write_json(record)?;

        if self.header.is_none() {
            let header: Vec<String> = record.keys().cloned().collect();
            self.csv.write_record(&header)?;
            self.header = Some(header);
        }
        let header = self.header.as_deref().unwrap_or_default();

        if !self.warned_extra_keys && record.keys().any(|k| !header.contains(k)) {
            warn!(
                "Record has columns outside the CSV header; they are kept in JSON only ({})",
                self.paths.csv.display()
            );
            self.warned_extra_keys = true;
        }

        let row: Vec<String> = header.iter().map(|key| csv_cell(record.get(key))).collect();
        self.csv.write_record(&row)?;

        self.records += 1;
        Ok(())
    }

    fn write_json(&mut self, record: &Record) -> Result<()> {
        let formatter = PrettyFormatter::with_indent(JSON_INDENT);
        let mut ser = serde_json::Serializer::with_formatter(&mut self.json, formatter);
        record.serialize(&mut ser)?;
        self.json.write_all(b"\n")?;
        Ok(())
    }

    /// Header derived from the first record, if any record was written
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Records written so far
    pub fn records_written(&self) -> usize {
        self.records
    }

    /// Output paths
    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    /// Flush both files and report what was written
    pub fn finish(mut self, pages: usize) -> Result<WriteSummary> {
        self.json.flush()?;
        self.csv.flush()?;
        Ok(WriteSummary {
            paths: self.paths,
            records: self.records,
            pages,
        })
    }
}

fn remove_existing(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed existing {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::output(format!(
            "Failed to remove {}: {e}",
            path.display()
        ))),
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::output(format!("Failed to open {}: {e}", path.display())))
}

/// Render a JSON value as a CSV cell
pub fn csv_cell(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Bool(b)) => b.to_string(),
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Write in-memory records as one operation
pub fn write_records(
    records: &[Record],
    dir: impl AsRef<Path>,
    name: &str,
) -> Result<WriteSummary> {
    let mut writer = PairWriter::create(dir, name)?;
    for record in records {
        writer.write_record(record)?;
    }
    writer.finish(1)
}
