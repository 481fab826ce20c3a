//! Record accessor
//!
//! Ties one remote object to the query builder, the remote client and
//! the materializer, and decides where results land on disk.

use super::types::RecordRequest;
use crate::client::{QueryClient, RetrievalResult, UpdatedRecords};
use crate::config::BulkSettings;
use crate::decode::CsvDecoder;
use crate::error::Result;
use crate::output::{ResultMaterializer, WriteSummary};
use crate::presets::{DatePreset, DatePresets};
use crate::query::build_query;
use crate::types::{Conditions, DateRange};
use chrono::{DateTime, Local, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// File name (without extension) of the full-object export
pub const ALL_RECORDS_NAME: &str = "all_records2";

/// Fetches records of one object and writes them under an output root
pub struct RecordAccessor {
    client: Arc<dyn QueryClient>,
    object: String,
    label: String,
    fields: Vec<String>,
    output_root: PathBuf,
    presets: DatePresets,
    bulk: BulkSettings,
    recent_updated: Option<UpdatedRecords>,
}

impl RecordAccessor {
    /// Describe `object` once and build the preset table.
    ///
    /// Fails when the object is unknown to the remote service.
    pub async fn new(
        client: Arc<dyn QueryClient>,
        object: impl Into<String>,
        output_root: impl Into<PathBuf>,
    ) -> Result<Self> {
        let object = object.into();
        let descriptor = client.describe(&object).await?;
        info!(
            "Described {} ({}): {} fields",
            descriptor.name,
            descriptor.label,
            descriptor.fields.len()
        );

        Ok(Self {
            client,
            fields: descriptor.field_names(),
            label: descriptor.label,
            object,
            output_root: output_root.into(),
            presets: DatePresets::new(),
            bulk: BulkSettings::default(),
            recent_updated: None,
        })
    }

    /// Replace the preset table
    #[must_use]
    pub fn with_presets(mut self, presets: DatePresets) -> Self {
        self.presets = presets;
        self
    }

    /// Bulk API 2.0 paging used by [`RecordAccessor::get_all_records`]
    #[must_use]
    pub fn with_bulk_settings(mut self, bulk: BulkSettings) -> Self {
        self.bulk = bulk;
        self
    }

    /// Object API name
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Object display label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Field names in describe order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Preset table
    pub fn presets(&self) -> &DatePresets {
        &self.presets
    }

    /// Output root directory
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Response of the last [`RecordAccessor::get_updated_records`] call
    pub fn recent_updated(&self) -> Option<&UpdatedRecords> {
        self.recent_updated.as_ref()
    }

    /// Fetch records and write them to disk.
    ///
    /// With nothing set this is [`RecordAccessor::get_all_records`]. Otherwise
    /// fields default to the full schema and a preset wins over an explicit
    /// range.
    pub async fn get_records(&self, request: &RecordRequest) -> Result<WriteSummary> {
        if request.is_unfiltered() {
            return self.get_all_records().await;
        }

        let fields = request.fields().unwrap_or(self.fields.as_slice());
        let range = self.resolve_range(request);
        self.query_filtered(fields, request.conditions(), range).await
    }

    /// Export every field of every record through Bulk API 2.0
    pub async fn get_all_records(&self) -> Result<WriteSummary> {
        let soql = build_query(&self.object, &self.fields, None, None, None);
        info!("Fetching all {} records", self.object);
        debug!("SOQL: {soql}");

        let pages = self
            .client
            .bulk_query_v2(
                &soql,
                self.bulk.max_records,
                self.bulk.column_delimiter,
                self.bulk.line_ending,
            )
            .await?;

        let dir = self.output_root.join("all_records").join(&self.object);
        ResultMaterializer::with_decoder(CsvDecoder::with_delimiter(self.bulk.column_delimiter))
            .write(RetrievalResult::Pages(pages), dir, ALL_RECORDS_NAME)
            .await
    }

    /// Run a filtered Bulk API 1.0 query and write the result
    pub async fn query_filtered<S: AsRef<str>>(
        &self,
        fields: &[S],
        conditions: Option<&Conditions>,
        range: Option<DateRange>,
    ) -> Result<WriteSummary> {
        let soql = build_query(
            &self.object,
            fields,
            conditions,
            range.map(|r| r.start()),
            range.map(|r| r.end()),
        );
        let (dir, name) = self.filtered_output(range);
        info!("Querying {} into {}", self.object, dir.display());
        debug!("SOQL: {soql}");

        let pages = self.client.bulk_query(&self.object, &soql).await?;
        ResultMaterializer::new()
            .write(RetrievalResult::Pages(pages), dir, &name)
            .await
    }

    /// Run a REST query for `request` and write the records to `<dir>/<name>`
    pub async fn query_records(
        &self,
        request: &RecordRequest,
        dir: impl AsRef<Path>,
        name: &str,
    ) -> Result<WriteSummary> {
        let fields = request.fields().unwrap_or(self.fields.as_slice());
        let range = self.resolve_range(request);
        let soql = build_query(
            &self.object,
            fields,
            request.conditions(),
            range.map(|r| r.start()),
            range.map(|r| r.end()),
        );
        debug!("SOQL: {soql}");

        let records = self.client.query(&soql).await?;
        ResultMaterializer::new()
            .write(RetrievalResult::Records(records), dir, name)
            .await
    }

    /// Ask the remote service which records changed in the preset window
    pub async fn get_updated_records(&mut self, preset: DatePreset) -> Result<UpdatedRecords> {
        let range = self.presets.get(preset);
        let updated = self
            .client
            .updated_records(&self.object, range.start(), range.end())
            .await?;
        self.recent_updated = Some(updated.clone());
        Ok(updated)
    }

    fn resolve_range(&self, request: &RecordRequest) -> Option<DateRange> {
        match request.date_preset {
            Some(preset) => Some(self.presets.get(preset)),
            None => request.date_range,
        }
    }

    /// Directory and file name for a filtered query
    pub fn filtered_output(&self, range: Option<DateRange>) -> (PathBuf, String) {
        let object_dir = self.output_root.join(&self.object);
        match range {
            Some(range) => (
                object_dir.join("by_date"),
                format!(
                    "from_{}_to_{}_data",
                    timestamp_literal(range.start()),
                    timestamp_literal(range.end())
                ),
            ),
            None => (
                object_dir.join("queries"),
                format!("{}_query_results", Local::now().format("%Y-%m-%d")),
            ),
        }
    }
}

impl std::fmt::Debug for RecordAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordAccessor")
            .field("object", &self.object)
            .field("label", &self.label)
            .field("fields", &self.fields.len())
            .field("output_root", &self.output_root)
            .finish_non_exhaustive()
    }
}

/// `YYYY-MM-DD HH:MM:SS[.ffffff]+00:00`, fraction only when non-zero
pub fn timestamp_literal(dt: DateTime<Utc>) -> String {
    let micros = dt.timestamp_subsec_micros();
    let base = dt.format("%Y-%m-%d %H:%M:%S");
    if micros == 0 {
        format!("{base}+00:00")
    } else {
        format!("{base}.{micros:06}+00:00")
    }
}
