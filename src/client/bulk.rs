//! Bulk job status handling
//!
//! Bulk API 1.0 answers in XML or JSON depending on the job's content
//! type and the `Accept` header; Bulk API 2.0 always answers in JSON.
//! Both are read into the same [`JobStatus`].

use crate::auth::{extract_xml_tag, extract_xml_tags};
use crate::error::{Error, Result};
use serde::Deserialize;

/// Status of a bulk job or batch as reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobStatus {
    /// Job or batch id
    #[serde(default)]
    pub id: String,
    /// Raw state name (`Queued`, `InProgress`, `JobComplete`, ...)
    pub state: String,
    /// Server-side failure message, if any
    #[serde(default, alias = "stateMessage", alias = "errorMessage")]
    pub message: Option<String>,
}

impl JobStatus {
    /// Classified state
    pub fn job_state(&self) -> JobState {
        JobState::from_api(&self.state)
    }
}

/// Classified job state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Still queued or running
    Pending,
    /// Results are ready
    Completed,
    /// The job will never produce results
    Failed,
}

impl JobState {
    /// Classify a state name from either bulk API
    pub fn from_api(state: &str) -> Self {
        match state {
            "Completed" | "JobComplete" => JobState::Completed,
            "Failed" | "Aborted" | "NotProcessed" => JobState::Failed,
            _ => JobState::Pending,
        }
    }

    /// Whether polling can stop
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobState::Pending)
    }
}

/// Parse a job or batch info body (JSON or XML)
pub fn parse_job_status(body: &str) -> Result<JobStatus> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    let state = extract_xml_tag(body, "state")
        .ok_or_else(|| Error::unexpected("Bulk status response has no <state>"))?;
    Ok(JobStatus {
        id: extract_xml_tag(body, "id").unwrap_or_default(),
        state,
        message: extract_xml_tag(body, "stateMessage").filter(|m| !m.is_empty()),
    })
}

/// Parse a Bulk API 1.0 batch result list (JSON array or `<result-list>`)
pub fn parse_result_ids(body: &str) -> Result<Vec<String>> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }
    if trimmed.starts_with('{') {
        #[derive(Deserialize)]
        struct ResultList {
            result: Vec<String>,
        }
        let list: ResultList = serde_json::from_str(trimmed)?;
        return Ok(list.result);
    }
    Ok(extract_xml_tags(body, "result"))
}
