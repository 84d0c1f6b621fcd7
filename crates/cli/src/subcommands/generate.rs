use crate::common_args;
use crate::config::{Config, DEFAULT_API_BASE, DEFAULT_API_MODEL, DEFAULT_PREDICTIONS_FILE};
use crate::generator::{AnswerGenerator, ChatCompletionsGenerator, PlaceholderGenerator, Provider};
use crate::subcommands::validate::print_report;
use crate::util::{format_points, load_questions, preview_ids};
use anyhow::Context;
use clap::ArgAction::SetTrue;
use clap::{value_parser, Arg, ArgMatches};
use colored::Colorize;
use futures::{stream, StreamExt};
use gertaxlaw_client_api_messages::{Predictions, Question, QuestionId, QuestionSet};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::PathBuf;

pub fn cli() -> clap::Command {
    clap::Command::new("generate")
        .about("Answer every benchmark question and write a predictions file")
        .arg(common_args::questions())
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_PREDICTIONS_FILE)
                .help("Where to write the predictions"),
        )
        .arg(
            Arg::new("provider")
                .long("provider")
                .short('p')
                .value_parser(value_parser!(Provider))
                .help("Answer backend: `placeholder` (default) or `openai`"),
        )
        .arg(
            Arg::new("api_base")
                .long("api-base")
                .env("OPENAI_BASE_URL")
                .help("Base URL of the OpenAI compatible API, including the version segment")
                .long_help(format!(
                    "Base URL of the OpenAI compatible API, including the version segment. Default: {DEFAULT_API_BASE}"
                )),
        )
        .arg(
            Arg::new("api_model")
                .long("api-model")
                .help("Model id sent to the API")
                .long_help(format!("Model id sent to the API. Default: {DEFAULT_API_MODEL}")),
        )
        .arg(
            Arg::new("api_key")
                .long("api-key")
                .env("OPENAI_API_KEY")
                .hide_env_values(true)
                .help("API key for the openai provider"),
        )
        .arg(
            Arg::new("concurrency")
                .long("concurrency")
                .short('j')
                .value_parser(value_parser!(u64).range(1..))
                .help("How many questions to answer at once (default 1)"),
        )
        .arg(
            Arg::new("resume")
                .long("resume")
                .action(SetTrue)
                .help("Keep non-empty answers already in the output file and only answer the rest"),
        )
        .after_help("Run `gertaxlaw help generate` for more detailed information.\n")
}

fn make_generator(config: &Config, args: &ArgMatches) -> anyhow::Result<Box<dyn AnswerGenerator>> {
    let provider = match args.get_one::<Provider>("provider") {
        Some(p) => *p,
        None => match config.generator().provider.as_deref() {
            Some(name) => name.parse().map_err(anyhow::Error::msg)?,
            None => Provider::default(),
        },
    };
    Ok(match provider {
        Provider::Placeholder => Box::new(PlaceholderGenerator),
        Provider::OpenAi => {
            let base = args
                .get_one::<String>("api_base")
                .map(String::as_str)
                .or(config.generator().api_base.as_deref())
                .unwrap_or(DEFAULT_API_BASE);
            let model = args
                .get_one::<String>("api_model")
                .map(String::as_str)
                .or(config.generator().api_model.as_deref())
                .unwrap_or(DEFAULT_API_MODEL);
            let api_key = args.get_one::<String>("api_key").cloned().unwrap_or_default();
            Box::new(ChatCompletionsGenerator::new(base, api_key, model)?)
        }
    })
}

fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("  [{bar:40.cyan/blue}] {pos}/{len} {msg}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn already_answered<'a>(previous: Option<&'a Predictions>, id: &QuestionId) -> Option<&'a str> {
    previous
        .and_then(|p| p.get(id.as_str()))
        .filter(|answer| !answer.trim().is_empty())
}

/// Result of one generation run.
#[derive(Debug)]
pub struct Generated {
    pub predictions: Predictions,
    /// Ids whose generation failed and were left empty, in question order.
    pub failed: Vec<QuestionId>,
}

/// Answer every question in `set` that `previous` has no non-empty answer for.
///
/// Output follows question order. A question whose generation fails gets an
/// empty answer so a later `--resume` run picks it up again.
pub async fn generate_predictions(
    set: &QuestionSet,
    generator: &dyn AnswerGenerator,
    previous: Option<&Predictions>,
    concurrency: usize,
    progress: &ProgressBar,
) -> Generated {
    let pending: Vec<&Question> = set
        .iter()
        .filter(|q| already_answered(previous, &q.id).is_none())
        .collect();
    progress.set_length(pending.len() as u64);

    let generated: HashMap<QuestionId, Option<String>> = stream::iter(pending)
        .map(|q| async move {
            progress.set_message(format!(
                "question {} ({})",
                q.id,
                q.category.as_deref().unwrap_or("uncategorized")
            ));
            let answer = match generator.answer(q).await {
                Ok(answer) => Some(answer),
                Err(err) => {
                    tracing::warn!(question = %q.id, error = %format!("{err:#}"), "generation failed");
                    progress.suspend(|| {
                        println!("{} question {}: {err:#}", "Generation failed for".yellow(), q.id)
                    });
                    None
                }
            };
            progress.inc(1);
            (q.id.clone(), answer)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut failed = Vec::new();
    let predictions = set
        .iter()
        .map(|q| {
            let answer = match already_answered(previous, &q.id) {
                Some(answer) => answer.to_string(),
                None => match generated.get(&q.id) {
                    Some(Some(answer)) => answer.clone(),
                    _ => {
                        failed.push(q.id.clone());
                        String::new()
                    }
                },
            };
            (q.id.to_string(), answer)
        })
        .collect();
    Generated { predictions, failed }
}

pub async fn exec(config: Config, args: &ArgMatches) -> Result<(), anyhow::Error> {
    let questions_path = config.questions_path(args.get_one::<PathBuf>("questions").map(PathBuf::as_path));
    let output = args.get_one::<PathBuf>("output").unwrap();
    let resume = args.get_flag("resume");
    let concurrency = args
        .get_one::<u64>("concurrency")
        .map(|&n| n as usize)
        .or(config.generator().concurrency)
        .unwrap_or(1);
    let generator = make_generator(&config, args)?;

    println!("Loading all benchmark questions...");
    let set = load_questions(&questions_path)?;
    println!("Found {} questions", set.len());
    println!("Total points: {}", format_points(set.total_points()));

    let previous = if resume && output.exists() {
        let text = fs_err::read_to_string(output)?;
        let previous = Predictions::from_json(&text)
            .with_context(|| format!("cannot resume from {}", output.display()))?;
        let kept = set.iter().filter(|q| already_answered(Some(&previous), &q.id).is_some()).count();
        println!("Resuming: keeping {kept} existing answers from {}", output.display());
        Some(previous)
    } else {
        None
    };

    println!("\nGenerating predictions with {}...", generator.name());
    let progress = progress_bar(set.len());
    let Generated { predictions, failed } =
        generate_predictions(&set, generator.as_ref(), previous.as_ref(), concurrency, &progress).await;
    progress.finish_and_clear();
    println!(
        "{} Generated {} predictions",
        "✓".green(),
        predictions.len() - failed.len()
    );

    fs_err::write(output, predictions.to_json_pretty())?;
    println!("\n{} Predictions saved to {}", "✓".green(), output.display());
    println!("\nNext step: Submit your predictions using:");
    println!("  gertaxlaw submit {} -m YourModelName", output.display());

    print_report(&predictions.check(Some(&set)));

    if !failed.is_empty() {
        println!(
            "\n{} {} generations failed; rerun with --resume",
            "✗".red(),
            failed.len()
        );
        anyhow::bail!(
            "generation failed for {} of {} questions: {}",
            failed.len(),
            set.len(),
            preview_ids(&failed)
        );
    }
    Ok(())
}
