use std::time::Duration;

use gertaxlaw_client_api_messages::http::{ErrorResponse, StatusResponse, SubmitResponse};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::util::ResponseExt;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// One upload to `POST /submit`.
#[derive(Debug, Clone)]
pub struct Submission {
    pub file_name: String,
    /// The predictions file exactly as it is on disk.
    pub contents: Vec<u8>,
    pub model_name: String,
    pub key: String,
}

/// A submission the server queued for grading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub submission_id: String,
    pub queue_position: Option<u64>,
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Submission failed: {}", error.as_deref().unwrap_or("unknown error"))]
    Rejected { error: Option<String>, details: Vec<String> },
    #[error("Invalid submission key")]
    InvalidKey,
    #[error("Too many submissions from your IP")]
    RateLimited,
    #[error("Server error: {status}\n   {message}")]
    Server { status: StatusCode, message: String },
    #[error("Could not connect to server at {server}\n   Make sure the server is running and the URL is correct")]
    Connect {
        server: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request timed out")]
    Timeout,
    #[error("Server accepted the submission without a submission id")]
    MissingSubmissionId,
    #[error("Unexpected error: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum StatusError {
    #[error("Could not fetch status (HTTP {0})")]
    Http(StatusCode),
    #[error("Error fetching status: {0:#}")]
    Request(#[from] anyhow::Error),
}

/// Map a non-`200` reply from `POST /submit` onto the failure it stands for.
fn classify_failure(status: StatusCode, body: &str) -> SubmitError {
    match status {
        StatusCode::FORBIDDEN => SubmitError::InvalidKey,
        StatusCode::TOO_MANY_REQUESTS => SubmitError::RateLimited,
        status => {
            let message = match serde_json::from_str::<ErrorResponse>(body) {
                Ok(ErrorResponse { error }) => error.unwrap_or_else(|| "Unknown error".to_string()),
                Err(_) => body.to_string(),
            };
            SubmitError::Server { status, message }
        }
    }
}

fn accepted(res: SubmitResponse) -> Result<Accepted, SubmitError> {
    if !res.success {
        return Err(SubmitError::Rejected {
            error: res.error,
            details: res.details,
        });
    }
    let submission_id = res.submission_id.ok_or(SubmitError::MissingSubmissionId)?;
    Ok(Accepted {
        submission_id,
        queue_position: res.queue_position,
    })
}

/// HTTP client for the benchmark server.
#[derive(Debug, Clone)]
pub struct ClientApi {
    server: String,
    client: Client,
    submit_timeout: Duration,
    status_timeout: Duration,
}

impl ClientApi {
    pub fn new(server: impl Into<String>) -> anyhow::Result<Self> {
        let server = server.into().trim_end_matches('/').to_string();
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;
        Ok(Self {
            server,
            client,
            submit_timeout: SUBMIT_TIMEOUT,
            status_timeout: STATUS_TIMEOUT,
        })
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn status_url(&self, submission_id: &str) -> String {
        format!("{}/status/{}", self.server, submission_id)
    }

    fn request_error(&self, err: reqwest::Error) -> SubmitError {
        if err.is_timeout() {
            SubmitError::Timeout
        } else if err.is_connect() {
            SubmitError::Connect {
                server: self.server.clone(),
                source: err,
            }
        } else {
            SubmitError::Unexpected(err.into())
        }
    }

    /// Upload predictions as a multipart form: the file under `file`, plus
    /// `model_name` and `key` fields.
    pub async fn submit(&self, submission: Submission) -> Result<Accepted, SubmitError> {
        let url = format!("{}/submit", self.server);
        let file = Part::bytes(submission.contents)
            .file_name(submission.file_name)
            .mime_str("application/json")
            .map_err(|e| SubmitError::Unexpected(e.into()))?;
        let form = Form::new()
            .part("file", file)
            .text("model_name", submission.model_name)
            .text("key", submission.key);

        tracing::debug!(%url, "submitting predictions");
        let res = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.submit_timeout)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = res.status();
        tracing::debug!(%status, "submit response");
        if status == StatusCode::OK {
            return accepted(res.json_or_error().await?);
        }
        let body = res.text().await.map_err(|e| self.request_error(e))?;
        Err(classify_failure(status, &body))
    }

    pub async fn status(&self, submission_id: &str) -> Result<StatusResponse, StatusError> {
        let url = self.status_url(submission_id);
        tracing::debug!(%url, "polling status");
        let res = self
            .client
            .get(&url)
            .timeout(self.status_timeout)
            .send()
            .await
            .map_err(anyhow::Error::from)?;
        if res.status() != StatusCode::OK {
            return Err(StatusError::Http(res.status()));
        }
        Ok(res.json_or_error().await?)
    }
}
