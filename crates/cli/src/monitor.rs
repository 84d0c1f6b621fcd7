use std::time::Duration;

use colored::Colorize;
use gertaxlaw_client_api_messages::http::{EvaluationStatus, StatusResponse};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::ClientApi;

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Something worth telling the user about after a status poll.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StatusChanged(EvaluationStatus),
    Queued { position: Option<u64> },
    Progress(u64),
    Completed { completed_at: Option<String> },
    Failed { error: Option<String> },
}

/// Turns successive status polls into the events that changed.
#[derive(Debug, Default)]
pub struct StatusTracker {
    last_status: Option<EvaluationStatus>,
    last_queue_position: Option<Option<u64>>,
    last_progress: Option<u64>,
}

impl StatusTracker {
    pub fn observe(&mut self, res: StatusResponse) -> Vec<Event> {
        let mut events = Vec::new();
        let changed = self.last_status.as_ref() != Some(&res.status);
        if changed {
            events.push(Event::StatusChanged(res.status.clone()));
            self.last_status = Some(res.status.clone());
        }

        match res.status {
            EvaluationStatus::Queued => {
                if changed || self.last_queue_position != Some(res.queue_position) {
                    events.push(Event::Queued {
                        position: res.queue_position,
                    });
                }
                self.last_queue_position = Some(res.queue_position);
            }
            EvaluationStatus::Evaluating => {
                let pct = res.progress_percent();
                if changed || self.last_progress != Some(pct) {
                    events.push(Event::Progress(pct));
                }
                self.last_progress = Some(pct);
            }
            EvaluationStatus::Completed => events.push(Event::Completed {
                completed_at: res.completed_at,
            }),
            EvaluationStatus::Failed => events.push(Event::Failed { error: res.error }),
            EvaluationStatus::Other(_) => {}
        }
        events
    }

    pub fn is_finished(&self) -> bool {
        self.last_status.as_ref().is_some_and(EvaluationStatus::is_terminal)
    }
}

#[derive(Default)]
struct ProgressView {
    bar: Option<ProgressBar>,
}

impl ProgressView {
    fn println(&self, line: impl AsRef<str>) {
        match &self.bar {
            // `ProgressBar::println` is a no-op on a hidden bar.
            Some(bar) => bar.suspend(|| println!("{}", line.as_ref())),
            None => println!("{}", line.as_ref()),
        }
    }

    fn render(&mut self, event: Event) {
        match event {
            Event::StatusChanged(status) => self.println(format!("   Status: {}", status.to_string().bold())),
            Event::Queued { position } => {
                let position = position.map_or_else(|| "?".to_string(), |p| p.to_string());
                self.println(format!("   Position in queue: {position}"));
            }
            Event::Progress(pct) => {
                let bar = self.bar.get_or_insert_with(|| {
                    let bar = ProgressBar::new(100);
                    if let Ok(style) = ProgressStyle::default_bar().template("   [{bar:30.cyan}] {pos}%") {
                        bar.set_style(style.progress_chars("█░"));
                    }
                    bar
                });
                bar.set_position(pct);
            }
            Event::Completed { completed_at } => {
                if let Some(bar) = self.bar.take() {
                    bar.finish();
                }
                println!("\n   {}", "Evaluation completed!".green().bold());
                println!("   Completed at: {}", completed_at.as_deref().unwrap_or("unknown"));
            }
            Event::Failed { error } => {
                if let Some(bar) = self.bar.take() {
                    bar.abandon();
                }
                println!(
                    "\n   {} {}",
                    "Evaluation failed:".red().bold(),
                    error.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }
}

async fn poll_until_finished(api: &ClientApi, submission_id: &str) -> EvaluationStatus {
    let mut tracker = StatusTracker::default();
    let mut view = ProgressView::default();
    loop {
        match api.status(submission_id).await {
            Ok(res) => {
                let status = res.status.clone();
                for event in tracker.observe(res) {
                    view.render(event);
                }
                if tracker.is_finished() {
                    return status;
                }
            }
            Err(crate::api::StatusError::Request(err)) => {
                tracing::warn!(error = %format!("{err:#}"), "status request failed");
                view.println(format!("   {} {err:#}", "Error fetching status:".yellow()));
                tokio::time::sleep(ERROR_BACKOFF).await;
                continue;
            }
            Err(err) => view.println(format!("   {}", err.to_string().yellow())),
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Poll the status endpoint until grading finishes or the user hits Ctrl+C.
///
/// Returns the terminal status, or `None` if monitoring was interrupted.
pub async fn monitor_status(api: &ClientApi, submission_id: &str) -> anyhow::Result<Option<EvaluationStatus>> {
    println!("\nMonitoring evaluation progress...");
    println!("   Press Ctrl+C to stop monitoring\n");

    tokio::select! {
        status = poll_until_finished(api, submission_id) => Ok(Some(status)),
        res = tokio::signal::ctrl_c() => {
            res?;
            println!("\n\n   Monitoring stopped. Evaluation continues on server.");
            Ok(None)
        }
    }
}
