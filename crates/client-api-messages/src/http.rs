use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of a `200` answer from `POST /submit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default, deserialize_with = "crate::question::opt_string_or_integer")]
    pub submission_id: Option<String>,
    #[serde(default)]
    pub queue_position: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// Error body the server sends along with non-success statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Where a submission is in the server's grading pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EvaluationStatus {
    Queued,
    Evaluating,
    Completed,
    Failed,
    Other(String),
}

impl EvaluationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Evaluating => "evaluating",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Other(s) => s,
        }
    }

    /// No further transitions happen after this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl From<String> for EvaluationStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "queued" => Self::Queued,
            "evaluating" => Self::Evaluating,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Other(s),
        }
    }
}

impl From<EvaluationStatus> for String {
    fn from(s: EvaluationStatus) -> Self {
        match s {
            EvaluationStatus::Other(s) => s,
            s => s.as_str().to_owned(),
        }
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `GET /status/{submission_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: EvaluationStatus,
    #[serde(default)]
    pub queue_position: Option<u64>,
    /// Percent of graded questions, `0..=100`.
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn progress_percent(&self) -> u64 {
        self.progress.unwrap_or(0.0).clamp(0.0, 100.0) as u64
    }
}
