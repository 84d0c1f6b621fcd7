use crate::api::{Accepted, ClientApi, Submission, SubmitError};
use crate::common_args;
use crate::config::Config;
use crate::monitor::monitor_status;
use crate::subcommands::validate::{enforce_strict, optional_questions, print_report, read_predictions};
use crate::util::y_or_n;
use clap::ArgAction::SetTrue;
use clap::{Arg, ArgMatches};
use colored::Colorize;
use std::path::PathBuf;

pub fn cli() -> clap::Command {
    clap::Command::new("submit")
        .about("Upload a predictions file to the benchmark server for grading")
        .arg(common_args::predictions_file())
        .arg(
            Arg::new("model")
                .long("model")
                .short('m')
                .env("GERTAXLAW_MODEL")
                .help("Model name shown on the leaderboard"),
        )
        .arg(common_args::key())
        .arg(common_args::server())
        .arg(common_args::questions())
        .arg(common_args::strict())
        .arg(
            Arg::new("monitor")
                .long("monitor")
                .action(SetTrue)
                .conflicts_with("no_monitor")
                .help("Follow evaluation progress without asking"),
        )
        .arg(
            Arg::new("no_monitor")
                .long("no-monitor")
                .action(SetTrue)
                .help("Exit right after the upload is accepted"),
        )
        .after_help(
            "Examples:
  gertaxlaw submit predictions.json --model \"GPT-4\" --key \"YourKey\"
  gertaxlaw submit predictions.json -m \"MyModel-v1\" -k \"YourKey\" -s http://localhost:5000

The predictions file is a JSON object of question id to answer:
  {
    \"1001\": \"Your answer for question 1001...\",
    \"1002\": \"Your answer for question 1002...\"
  }
",
        )
}

fn print_failure(err: &SubmitError) {
    println!("\n{} {err}", "Error:".red().bold());
    if let SubmitError::Rejected { details, .. } = err {
        if !details.is_empty() {
            println!("\nDetails:");
            for detail in details {
                println!("  • {detail}");
            }
        }
    }
}

fn print_accepted(api: &ClientApi, accepted: &Accepted) {
    println!("\n{}", "Submission successful!".green().bold());
    println!("   Submission ID: {}", accepted.submission_id);
    match accepted.queue_position {
        Some(pos) => println!("   Queue position: {pos}"),
        None => println!("   Queue position: unknown"),
    }
    println!("   Status URL: {}", api.status_url(&accepted.submission_id));
}

pub async fn exec(config: Config, args: &ArgMatches) -> Result<(), anyhow::Error> {
    let path = args.get_one::<PathBuf>("predictions_file").unwrap();
    let model_name = config.model_name(args.get_one::<String>("model").map(String::as_str))?;
    let key = config.submission_key(args.get_one::<String>("key").map(String::as_str));
    let server = config.server_url(args.get_one::<String>("server").map(String::as_str));
    let strict = args.get_flag("strict");
    let questions = optional_questions(&config, args.get_one::<PathBuf>("questions"))?;

    let (contents, predictions) = match read_predictions(path) {
        Ok(read) => read,
        Err(err) => {
            println!("{} {err:#}", "Error:".red().bold());
            anyhow::bail!("Submission failed. Please check the errors above.");
        }
    };
    println!(
        "{} Predictions file validated: {} answers",
        "OK".green().bold(),
        predictions.len()
    );
    let report = predictions.check(questions.as_ref());
    if !report.is_complete() {
        print_report(&report);
    }
    enforce_strict(&report, strict)?;

    let api = ClientApi::new(server)?;
    println!("\nSubmitting predictions to {}", api.server());
    println!("   Model: {model_name}");
    println!("   Questions: {}", predictions.len());

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "predictions.json".to_string());
    let submission = Submission {
        file_name,
        contents,
        model_name,
        key,
    };

    let accepted = match api.submit(submission).await {
        Ok(accepted) => accepted,
        Err(err) => {
            print_failure(&err);
            anyhow::bail!("Submission failed. Please check the errors above.");
        }
    };
    print_accepted(&api, &accepted);

    let monitor = if args.get_flag("no_monitor") {
        false
    } else {
        y_or_n(args.get_flag("monitor"), "\nMonitor evaluation progress?")?
    };
    if monitor {
        monitor_status(&api, &accepted.submission_id).await?;
    }

    println!("\n{}", "Done! Check the leaderboard for results.".bold());
    Ok(())
}
