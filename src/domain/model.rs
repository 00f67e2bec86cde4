use crate::utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One item of the API response. Key order follows the response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: serde_json::Map<String, serde_json::Value>,
}

pub type RecordBatch = Vec<Record>;

/// Tab-separated text produced by the transform stage, buffered whole in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredPayload {
    pub columns: Vec<String>,
    pub row_count: usize,
    body: Vec<u8>,
}

impl FilteredPayload {
    pub fn new(columns: Vec<String>, row_count: usize, body: Vec<u8>) -> Self {
        Self {
            columns,
            row_count,
            body,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Init,
    Validating,
    Fetching,
    Transforming,
    Uploading,
    Notifying,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "Init",
            Stage::Validating => "Validate Environment",
            Stage::Fetching => "Fetch Data",
            Stage::Transforming => "Process Data",
            Stage::Uploading => "S3 Upload",
            Stage::Notifying => "Notify",
            Stage::Done => "Done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Successful,
    Failed { reason: String },
}

/// Final classification of a run. Drives both the notification and the returned status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    ConfigurationFailed(ConfigError),
    FetchFailed(String),
    TransformFailed(String),
    UploadFailed(String),
}

pub const FAILURE_SUBJECT: &str = "Data Pipeline Failure Notification";
pub const SUCCESS_SUBJECT: &str = "Data Pipeline Success Notification";

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }

    pub fn status_code(&self) -> u16 {
        if self.is_success() {
            200
        } else {
            500
        }
    }

    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            RunOutcome::Success => None,
            RunOutcome::ConfigurationFailed(_) => Some(Stage::Validating),
            RunOutcome::FetchFailed(_) => Some(Stage::Fetching),
            RunOutcome::TransformFailed(_) => Some(Stage::Transforming),
            RunOutcome::UploadFailed(_) => Some(Stage::Uploading),
        }
    }

    /// Short body returned to the caller.
    pub fn body(&self) -> &'static str {
        match self {
            RunOutcome::Success => "Pipeline completed successfully.",
            RunOutcome::ConfigurationFailed(ConfigError::MissingConfiguration { .. }) => {
                "Missing required environment variables."
            }
            RunOutcome::ConfigurationFailed(ConfigError::InvalidValue { .. }) => {
                "Invalid configuration."
            }
            RunOutcome::FetchFailed(_) => "Data fetch failed.",
            RunOutcome::TransformFailed(_) => "Data processing failed.",
            RunOutcome::UploadFailed(_) => "S3 upload failed.",
        }
    }

    pub fn subject(&self) -> &'static str {
        if self.is_success() {
            SUCCESS_SUBJECT
        } else {
            FAILURE_SUBJECT
        }
    }

    /// Human-readable status line sent with the notification.
    pub fn message(&self) -> String {
        match self {
            RunOutcome::Success => "All pipeline processes completed successfully!".to_string(),
            RunOutcome::ConfigurationFailed(err) => err.to_string(),
            RunOutcome::FetchFailed(detail)
            | RunOutcome::TransformFailed(detail)
            | RunOutcome::UploadFailed(detail) => {
                let stage = self.failed_stage().unwrap_or(Stage::Init);
                format!("Data pipeline failed at the {} stage: {}", stage, detail)
            }
        }
    }
}

/// Result handed back to the invoker, serialized as `{"statusCode", "body"}`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
    #[serde(skip)]
    pub outcome: RunOutcome,
}

impl From<RunOutcome> for RunReport {
    fn from(outcome: RunOutcome) -> Self {
        Self {
            status_code: outcome.status_code(),
            body: outcome.body().to_string(),
            outcome,
        }
    }
}
