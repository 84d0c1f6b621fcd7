mod util;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;
use axum::http::StatusCode;
use util::{FakeServer, BAD_KEY, THROTTLED_KEY};

const QUESTIONS: &str = r#"[
    {"id": 1001, "question": "Wie hoch ist der Grundfreibetrag 2024?", "max_score": 2,
     "title": "Grundfreibetrag", "category": "Einkommensteuer", "exam": "Klausur A", "year": "2023/24"},
    {"id": 1002, "question": "Wann liegt eine Organschaft vor?", "max_score": 3.5,
     "category": "Körperschaftsteuer"}
]"#;

/// A scratch directory holding a question file, and a command that ignores the user's config.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("benchmark-questions.json"), QUESTIONS).unwrap();
    dir
}

fn gertaxlaw(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("gertaxlaw");
    cmd.current_dir(dir)
        .env("GERTAXLAW_CONFIG", dir.join("no-such-config.toml"))
        .env_remove("GERTAXLAW_SERVER")
        .env_remove("GERTAXLAW_KEY")
        .env_remove("GERTAXLAW_MODEL")
        .env_remove("GERTAXLAW_QUESTIONS")
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn questions_summary() {
    let dir = workspace();
    gertaxlaw(dir.path())
        .args(["questions", "--by-category"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 questions"))
        .stdout(predicate::str::contains("Total points: 5.5"))
        .stdout(predicate::str::contains("Körperschaftsteuer"));
}

#[test]
fn missing_question_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    gertaxlaw(dir.path())
        .arg("questions")
        .assert()
        .failure()
        .stderr(predicate::str::contains("benchmark-questions.json not found"));
}

#[test]
fn generate_with_placeholder_writes_every_answer() {
    let dir = workspace();
    gertaxlaw(dir.path())
        .args(["generate", "-o", "out.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 questions"))
        .stdout(predicate::str::contains("Predictions saved to out.json"))
        .stdout(predicate::str::contains("All answers non-empty"));

    let written = std::fs::read_to_string(dir.path().join("out.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    let map = value.as_object().unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["1001", "1002"]);
    assert!(map["1002"].as_str().unwrap().contains("question 1002"));
}

#[test]
fn openai_provider_requires_a_key() {
    let dir = workspace();
    gertaxlaw(dir.path())
        .args(["generate", "--provider", "openai"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is required"));
}

#[test]
fn validate_accepts_complete_predictions() {
    let dir = workspace();
    std::fs::write(
        dir.path().join("predictions.json"),
        r#"{"1001": "11.604 Euro", "1002": "Bei finanzieller Eingliederung"}"#,
    )
    .unwrap();
    gertaxlaw(dir.path())
        .args(["validate", "predictions.json", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Predictions file validated: 2 answers"));
}

#[test]
fn validate_rejects_non_object() {
    let dir = workspace();
    std::fs::write(dir.path().join("predictions.json"), r#"["a"]"#).unwrap();
    gertaxlaw(dir.path())
        .args(["validate", "predictions.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a JSON object"));
}

#[test]
fn validate_strict_flags_gaps() {
    let dir = workspace();
    std::fs::write(dir.path().join("predictions.json"), r#"{"1001": " "}"#).unwrap();
    gertaxlaw(dir.path())
        .args(["validate", "predictions.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Answer for question 1001 is empty"))
        .stdout(predicate::str::contains("1 questions have no answer: 1002"));

    gertaxlaw(dir.path())
        .args(["validate", "predictions.json", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 empty, 1 missing, 0 unknown"));
}

#[test]
fn submit_requires_a_model_name() {
    let dir = workspace();
    std::fs::write(dir.path().join("predictions.json"), r#"{"1001": "a", "1002": "b"}"#).unwrap();
    gertaxlaw(dir.path())
        .args(["submit", "predictions.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A model name is required"));
}

#[test]
fn submit_against_server() {
    let server = FakeServer::start();
    let dir = workspace();
    std::fs::write(dir.path().join("predictions.json"), r#"{"1001": "a", "1002": "b"}"#).unwrap();

    gertaxlaw(dir.path())
        .args(["submit", "predictions.json", "-m", "MyModel-v1", "--no-monitor", "-s", &server.url])
        .assert()
        .success()
        .stdout(predicate::str::contains("Submission successful!"))
        .stdout(predicate::str::contains("Submission ID: sub-1"))
        .stdout(predicate::str::contains(format!("Status URL: {}/status/sub-1", server.url)));

    let received = server.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].key.as_deref(), Some("GerTaxLaw2025"));

    gertaxlaw(dir.path())
        .args(["submit", "predictions.json", "-m", "MyModel-v1", "--no-monitor"])
        .args(["-s", &server.url, "-k", BAD_KEY])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid submission key"));
}

#[test]
fn rate_limited_submission_fails() {
    let server = FakeServer::start();
    let dir = workspace();
    std::fs::write(dir.path().join("predictions.json"), r#"{"1001": "a", "1002": "b"}"#).unwrap();

    gertaxlaw(dir.path())
        .args(["submit", "predictions.json", "-m", "MyModel-v1", "--no-monitor"])
        .args(["-s", &server.url, "-k", THROTTLED_KEY])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Too many submissions from your IP"))
        .stderr(predicate::str::contains("Submission failed"));
}

#[test]
fn submit_does_not_upload_invalid_files() {
    let server = FakeServer::start();
    let dir = workspace();
    std::fs::write(dir.path().join("predictions.json"), r#"{"1001": 5}"#).unwrap();

    gertaxlaw(dir.path())
        .args(["submit", "predictions.json", "-m", "m", "-s", &server.url])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Answer for question 1001 must be a string"));
    assert!(server.received().is_empty());
}

#[test]
fn status_one_shot() {
    let server = FakeServer::start();
    server.push_status(serde_json::json!({"status": "queued", "queue_position": 4}));
    let dir = workspace();
    gertaxlaw(dir.path())
        .args(["status", "sub-1", "-s", &server.url])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: queued"))
        .stdout(predicate::str::contains("Position in queue: 4"));
}

#[test]
fn status_watch_prints_every_change() {
    let server = FakeServer::start();
    server.push_status(serde_json::json!({"status": "evaluating", "progress": 50}));
    server.push_status(serde_json::json!({"status": "failed", "error": "judge crashed"}));
    let dir = workspace();
    gertaxlaw(dir.path())
        .args(["status", "sub-1", "--watch", "-s", &server.url])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: evaluating"))
        .stdout(predicate::str::contains("Status: failed"))
        .stdout(predicate::str::contains("Evaluation failed: judge crashed"));
}

#[test]
fn status_watch_warns_on_server_errors() {
    let server = FakeServer::start();
    server.push_status(serde_json::json!({"status": "evaluating", "progress": 10}));
    server.push_raw_status(StatusCode::SERVICE_UNAVAILABLE, "busy");
    let dir = workspace();
    gertaxlaw(dir.path())
        .args(["status", "sub-1", "--watch", "-s", &server.url])
        .assert()
        .success()
        .stdout(predicate::str::contains("Could not fetch status (HTTP 503"))
        .stdout(predicate::str::contains("Status: completed"))
        .stdout(predicate::str::contains("Evaluation completed!"));
}

#[test]
fn failed_generations_exit_non_zero() {
    let dir = workspace();
    gertaxlaw(dir.path())
        .args(["generate", "-o", "out.json", "--provider", "openai"])
        .args(["--api-base", "http://127.0.0.1:9", "--api-key", "sk-test"])
        .env_remove("NO_COLOR")
        .assert()
        .failure()
        // Log lines on a redirected stderr stay plain.
        .stderr(predicate::str::contains("WARN"))
        .stderr(predicate::str::contains("\u{1b}[").not())
        .stdout(predicate::str::contains("Generation failed for question 1001"))
        .stdout(predicate::str::contains("2 generations failed; rerun with --resume"))
        .stderr(predicate::str::contains("generation failed for 2 of 2 questions"));

    let written = std::fs::read_to_string(dir.path().join("out.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value, serde_json::json!({"1001": "", "1002": ""}));
}

#[test]
fn help_ignores_a_broken_config() {
    let dir = workspace();
    let config = dir.path().join("cli.toml");
    std::fs::write(&config, "server = [").unwrap();
    gertaxlaw(dir.path())
        .env("GERTAXLAW_CONFIG", &config)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: gertaxlaw"));
    gertaxlaw(dir.path())
        .env("GERTAXLAW_CONFIG", &config)
        .arg("questions")
        .assert()
        .failure();
}
