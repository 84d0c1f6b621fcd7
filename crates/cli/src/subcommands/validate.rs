use crate::common_args;
use crate::config::Config;
use crate::util::{load_questions, preview_ids};
use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use gertaxlaw_client_api_messages::predictions::ValidationReport;
use gertaxlaw_client_api_messages::{Predictions, QuestionSet};
use std::path::{Path, PathBuf};

pub fn cli() -> clap::Command {
    clap::Command::new("validate")
        .about("Check a predictions file before submitting it")
        .arg(common_args::predictions_file())
        .arg(common_args::questions().help(
            "Path to benchmark-questions.json. When the file exists, every question must have an answer",
        ))
        .arg(common_args::strict())
        .after_help("Run `gertaxlaw help validate` for more detailed information.\n")
}

/// The question set to check coverage against, if one is available.
///
/// An explicitly configured path must exist; the default path is optional.
pub(crate) fn optional_questions(config: &Config, arg: Option<&PathBuf>) -> anyhow::Result<Option<QuestionSet>> {
    let path = config.questions_path(arg.map(PathBuf::as_path));
    if arg.is_none() && !path.exists() {
        tracing::debug!(path = %path.display(), "no question set, skipping coverage checks");
        return Ok(None);
    }
    load_questions(&path).map(Some)
}

/// Parse `path` as predictions. Hard format errors abort.
pub(crate) fn read_predictions(path: &Path) -> anyhow::Result<(Vec<u8>, Predictions)> {
    let contents = fs_err::read(path).context("Error reading file")?;
    let text = std::str::from_utf8(&contents).context("Predictions file is not valid UTF-8")?;
    let predictions = Predictions::from_json(text)?;
    Ok((contents, predictions))
}

/// Print per-answer warnings and the validation block.
pub(crate) fn print_report(report: &ValidationReport) {
    for qid in &report.empty {
        println!("{} Answer for question {qid} is empty", "Warning:".yellow());
    }

    println!("\n{}", "=".repeat(60));
    println!("VALIDATION CHECK");
    println!("{}", "=".repeat(60));
    println!("Total predictions: {}", report.answers);
    if let Some(expected) = report.expected {
        println!("Expected questions: {expected}");
        println!("All IDs present: {}", check_mark(report.all_ids_present()));
        if !report.missing.is_empty() {
            println!(
                "{} {} questions have no answer: {}",
                "Warning:".yellow(),
                report.missing.len(),
                preview_ids(&report.missing)
            );
        }
        if !report.unknown.is_empty() {
            println!(
                "{} {} answers are for unknown question IDs: {}",
                "Warning:".yellow(),
                report.unknown.len(),
                preview_ids(&report.unknown)
            );
        }
    }
    if report.empty.is_empty() {
        println!("All answers non-empty: {}", check_mark(true));
    } else {
        println!(
            "{} {} empty answers found!\n  Question IDs: {}",
            "Warning:".yellow(),
            report.empty.len(),
            preview_ids(&report.empty)
        );
    }
    println!("{}", "=".repeat(60));
}

fn check_mark(ok: bool) -> colored::ColoredString {
    if ok { "✓".green() } else { "✗".red() }
}

pub(crate) fn enforce_strict(report: &ValidationReport, strict: bool) -> anyhow::Result<()> {
    if strict && !report.is_complete() {
        anyhow::bail!(
            "Predictions are incomplete: {} empty, {} missing, {} unknown",
            report.empty.len(),
            report.missing.len(),
            report.unknown.len()
        );
    }
    Ok(())
}

pub async fn exec(config: Config, args: &ArgMatches) -> Result<(), anyhow::Error> {
    let path = args.get_one::<PathBuf>("predictions_file").unwrap();
    let strict = args.get_flag("strict");
    let questions = optional_questions(&config, args.get_one::<PathBuf>("questions"))?;

    let (_, predictions) = read_predictions(path)?;
    println!(
        "{} Predictions file validated: {} answers",
        "OK".green().bold(),
        predictions.len()
    );

    let report = predictions.check(questions.as_ref());
    print_report(&report);
    enforce_strict(&report, strict)
}
