use anyhow::Context;
use gertaxlaw_client_api_messages::{QuestionId, QuestionSet};
use std::io::Write;
use std::path::Path;

/// At most this many question ids are listed inline in warnings.
pub const MAX_LISTED_IDS: usize = 5;

pub(crate) trait ResponseExt: Sized {
    /// Like [`reqwest::Response::json()`], but turns a non-JSON body into an
    /// error carrying the response text.
    async fn json_or_error<T: serde::de::DeserializeOwned>(self) -> anyhow::Result<T>;
}

fn err_status_desc(status: http::StatusCode) -> Option<&'static str> {
    if status.is_success() {
        None
    } else if status.is_client_error() {
        Some("HTTP status client error")
    } else if status.is_server_error() {
        Some("HTTP status server error")
    } else {
        Some("unexpected HTTP status code")
    }
}

impl ResponseExt for reqwest::Response {
    async fn json_or_error<T: serde::de::DeserializeOwned>(self) -> anyhow::Result<T> {
        let status = self.status();
        let url = self.url().to_string();
        let is_json = self
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|ty| ty.to_str().ok())
            .is_some_and(|ty| ty.starts_with("application/json"));
        if is_json {
            return self.json().await.map_err(|err| {
                let mut err = anyhow::Error::from(err);
                if let Some(desc) = err_status_desc(status) {
                    err = err.context(format!("malformed json payload for {desc} ({status})"))
                }
                err
            });
        }
        let desc = err_status_desc(status).unwrap_or("HTTP response without a JSON body");
        let text = self.text().await.context("failed to get response text")?;
        Err(anyhow::anyhow!("{desc} ({status}) from url ({url})").context(text))
    }
}

/// Read and parse the question set, with a hint when the file is missing.
pub fn load_questions(path: &Path) -> anyhow::Result<QuestionSet> {
    if !path.exists() {
        anyhow::bail!(
            "{} not found!\nRun from the benchmark kit directory or pass `--questions <PATH>`.",
            path.display()
        );
    }
    let text = fs_err::read_to_string(path)?;
    QuestionSet::from_json(&text).with_context(|| format!("failed to load questions from {}", path.display()))
}

/// `1001, 1002, 1003` with a trailing `...` once more than [`MAX_LISTED_IDS`] are given.
pub fn preview_ids(ids: &[QuestionId]) -> String {
    let mut out = ids
        .iter()
        .take(MAX_LISTED_IDS)
        .map(QuestionId::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if ids.len() > MAX_LISTED_IDS {
        out.push_str(", ...");
    }
    out
}

/// Scores are half-point granular; print them without a pointless `.0`.
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{points:.0}")
    } else {
        format!("{points}")
    }
}

/// Prompt the user for `y` or `n` from stdin.
///
/// Return `false` unless the input is `y`.
pub fn y_or_n(force: bool, prompt: &str) -> anyhow::Result<bool> {
    if force {
        return Ok(true);
    }
    let mut input = String::new();
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    std::io::stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
