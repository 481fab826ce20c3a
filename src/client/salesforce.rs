//! Salesforce implementation of [`QueryClient`]

use super::bulk::{parse_job_status, parse_result_ids, JobState, JobStatus};
use super::types::{ObjectDescriptor, PageStream, UpdatedRecords};
use super::QueryClient;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::query::format_datetime;
use crate::types::{ColumnDelimiter, JsonValue, LineEnding, Record};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Response header carrying the Bulk API 2.0 result cursor
pub const LOCATOR_HEADER: &str = "Sforce-Locator";

/// Settings for [`SalesforceClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesforceClientConfig {
    /// API version without the `v`, e.g. `59.0`
    pub api_version: String,
    /// Delay between bulk status checks
    pub poll_interval: Duration,
    /// Status checks before a bulk job is given up on
    pub max_poll_attempts: u32,
}

impl Default for SalesforceClientConfig {
    fn default() -> Self {
        Self {
            api_version: "59.0".to_string(),
            poll_interval: Duration::from_secs(10),
            max_poll_attempts: 60,
        }
    }
}

/// One page of a REST query response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryPage {
    #[serde(default)]
    total_size: usize,
    #[serde(default = "default_done")]
    done: bool,
    #[serde(default)]
    records: Vec<Record>,
    #[serde(default)]
    next_records_url: Option<String>,
}

fn default_done() -> bool {
    true
}

/// Query client talking to one Salesforce instance.
///
/// The wrapped [`HttpClient`] must have the instance URL as its base URL
/// and carry the session authenticator.
#[derive(Debug, Clone)]
pub struct SalesforceClient {
    http: Arc<HttpClient>,
    config: SalesforceClientConfig,
}

impl SalesforceClient {
    /// Create a client over an authenticated HTTP client
    pub fn new(http: HttpClient, config: SalesforceClientConfig) -> Self {
        Self {
            http: Arc::new(http),
            config,
        }
    }

    /// The underlying HTTP client
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Client settings
    pub fn config(&self) -> &SalesforceClientConfig {
        &self.config
    }

    fn data_path(&self) -> String {
        format!("/services/data/v{}", self.config.api_version)
    }

    fn async_path(&self) -> String {
        format!("/services/async/{}", self.config.api_version)
    }

    /// Poll `fetch` until the job reaches a terminal state
    async fn wait_for<F, Fut>(&self, job_id: &str, mut fetch: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<JobStatus>>,
    {
        let max = self.config.max_poll_attempts.max(1);
        let mut last_state = String::new();

        for attempt in 1..=max {
            let status = fetch().await?;
            match status.job_state() {
                JobState::Completed => {
                    debug!("Bulk job {job_id} completed after {attempt} checks");
                    return Ok(());
                }
                JobState::Failed => {
                    let message = status
                        .message
                        .unwrap_or_else(|| "no message from server".to_string());
                    return Err(Error::bulk_job(job_id, status.state, message));
                }
                JobState::Pending => {
                    debug!("Bulk job {job_id} is {} ({attempt}/{max})", status.state);
                    last_state = status.state;
                }
            }
            if attempt < max {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }

        Err(Error::bulk_job(
            job_id,
            last_state,
            format!("not finished after {max} status checks"),
        ))
    }

    async fn fetch_status(&self, url: &str, config: RequestConfig) -> Result<JobStatus> {
        let body = self.http.request_text(Method::GET, url, config).await?;
        parse_job_status(&body)
    }
}

#[async_trait]
impl QueryClient for SalesforceClient {
    async fn describe(&self, object: &str) -> Result<ObjectDescriptor> {
        let url = format!("{}/sobjects/{object}/describe", self.data_path());
        debug!("Describing {object}");

        self.http.get_json(&url).await.map_err(|e| match e {
            Error::HttpStatus { status, body } => Error::Describe {
                object: object.to_string(),
                message: format!("HTTP {status}: {body}"),
            },
            other => other,
        })
    }

    async fn query(&self, soql: &str) -> Result<Vec<Record>> {
        let url = format!("{}/query", self.data_path());
        debug!("REST query: {soql}");

        let mut page: QueryPage = self
            .http
            .get_json_with_config(&url, RequestConfig::new().query("q", soql))
            .await?;
        let mut records = Vec::with_capacity(page.total_size);

        loop {
            let QueryPage {
                done,
                records: batch,
                next_records_url,
                ..
            } = page;
            records.extend(batch.into_iter().map(strip_attributes));

            match next_records_url {
                Some(next) if !done => page = self.http.get_json(&next).await?,
                _ => break,
            }
        }

        info!("REST query returned {} records", records.len());
        Ok(records)
    }

    async fn bulk_query(&self, object: &str, soql: &str) -> Result<PageStream> {
        let base = self.async_path();

        let job: JobStatus = self
            .http
            .request_json(
                Method::POST,
                &format!("{base}/job"),
                RequestConfig::new().bulk_session().json(json!({
                    "operation": "query",
                    "object": object,
                    "contentType": "CSV",
                })),
            )
            .await?;
        info!("Created bulk job {} for {object}", job.id);

        let job_url = format!("{base}/job/{}", job.id);
        let body = self
            .http
            .request_text(
                Method::POST,
                &format!("{job_url}/batch"),
                RequestConfig::new()
                    .bulk_session()
                    .text("text/csv; charset=UTF-8", soql),
            )
            .await?;
        let batch = parse_job_status(&body)?;

        // No more batches will be added
        self.http
            .request(
                Method::POST,
                &job_url,
                RequestConfig::new()
                    .bulk_session()
                    .json(json!({"state": "Closed"})),
            )
            .await?;

        let batch_url = format!("{job_url}/batch/{}", batch.id);
        self.wait_for(&batch.id, || {
            self.fetch_status(&batch_url, RequestConfig::new().bulk_session())
        })
        .await?;

        let body = self
            .http
            .request_text(
                Method::GET,
                &format!("{batch_url}/result"),
                RequestConfig::new().bulk_session(),
            )
            .await?;
        let result_ids = parse_result_ids(&body)?;
        debug!("Batch {} has {} result sets", batch.id, result_ids.len());

        let http = Arc::clone(&self.http);
        let pages = stream::iter(result_ids).then(move |result_id| {
            let http = Arc::clone(&http);
            let url = format!("{batch_url}/result/{result_id}");
            async move {
                http.request_text(Method::GET, &url, RequestConfig::new().bulk_session())
                    .await
            }
        });
        Ok(pages.boxed())
    }

    async fn bulk_query_v2(
        &self,
        soql: &str,
        max_records: u32,
        column_delimiter: ColumnDelimiter,
        line_ending: LineEnding,
    ) -> Result<PageStream> {
        let jobs_url = format!("{}/jobs/query", self.data_path());

        let job: JobStatus = self
            .http
            .request_json(
                Method::POST,
                &jobs_url,
                RequestConfig::new().json(json!({
                    "operation": "query",
                    "query": soql,
                    "columnDelimiter": column_delimiter,
                    "lineEnding": line_ending,
                })),
            )
            .await?;
        info!("Created bulk v2 query job {}", job.id);

        let job_url = format!("{jobs_url}/{}", job.id);
        self.wait_for(&job.id, || self.fetch_status(&job_url, RequestConfig::new()))
            .await?;

        let http = Arc::clone(&self.http);
        let results_url = format!("{job_url}/results");

        // None: finished. Some(None): first page. Some(Some(locator)): next page.
        let pages = stream::try_unfold(Some(None::<String>), move |cursor| {
            let http = Arc::clone(&http);
            let url = results_url.clone();
            async move {
                let Some(locator) = cursor else {
                    return Ok(None);
                };
                fetch_result_page(&http, &url, locator.as_deref(), max_records)
                    .await
                    .map(|(page, next)| Some((page, next.map(Some))))
            }
        });
        Ok(pages.boxed())
    }

    async fn updated_records(
        &self,
        object: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<UpdatedRecords> {
        let url = format!("{}/sobjects/{object}/updated/", self.data_path());
        let config = RequestConfig::new()
            .query("start", format_datetime(start))
            .query("end", format_datetime(end));

        let updated: UpdatedRecords = self.http.get_json_with_config(&url, config).await?;
        info!("{} {object} records changed in window", updated.ids.len());
        Ok(updated)
    }
}

/// Fetch one Bulk API 2.0 result page and the locator of the next one
async fn fetch_result_page(
    http: &HttpClient,
    url: &str,
    locator: Option<&str>,
    max_records: u32,
) -> Result<(String, Option<String>)> {
    let mut config = RequestConfig::new()
        .header("Accept", "text/csv")
        .query("maxRecords", max_records.to_string());
    if let Some(locator) = locator {
        config = config.query("locator", locator);
    }

    let response = http.request(Method::GET, url, config).await?;
    let next = response
        .headers()
        .get(LOCATOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && *v != "null")
        .map(String::from);
    let page = response.text().await.map_err(Error::Http)?;

    debug!("Fetched result page ({} bytes)", page.len());
    Ok((page, next))
}

/// Drop the per-record `attributes` metadata, including on nested records
fn strip_attributes(record: Record) -> Record {
    record
        .into_iter()
        .filter(|(key, _)| key != "attributes")
        .map(|(key, value)| (key, strip_value(value)))
        .collect()
}

fn strip_value(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => JsonValue::Object(strip_attributes(map)),
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(strip_value).collect()),
        other => other,
    }
}
