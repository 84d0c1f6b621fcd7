use crate::common_args;
use crate::config::Config;
use crate::util::{format_points, load_questions};
use clap::{Arg, ArgAction::SetTrue, ArgMatches};
use gertaxlaw_client_api_messages::QuestionSet;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub fn cli() -> clap::Command {
    clap::Command::new("questions")
        .about("Summarize the benchmark question set")
        .arg(common_args::questions())
        .arg(
            Arg::new("by_category")
                .long("by-category")
                .action(SetTrue)
                .help("Break the summary down by tax law category"),
        )
}

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct CategoryTotals {
    pub questions: usize,
    pub points: f64,
}

pub(crate) fn by_category(set: &QuestionSet) -> BTreeMap<&str, CategoryTotals> {
    let mut out: BTreeMap<&str, CategoryTotals> = BTreeMap::new();
    for q in set {
        let entry = out.entry(q.category.as_deref().unwrap_or("(uncategorized)")).or_default();
        entry.questions += 1;
        entry.points += q.max_score;
    }
    out
}

pub async fn exec(config: Config, args: &ArgMatches) -> Result<(), anyhow::Error> {
    let path = config.questions_path(args.get_one::<PathBuf>("questions").map(PathBuf::as_path));
    let set = load_questions(&path)?;

    println!("Found {} questions", set.len());
    println!("Total points: {}", format_points(set.total_points()));

    if args.get_flag("by_category") {
        let rows = by_category(&set);
        let width = rows.keys().map(|c| c.chars().count()).max().unwrap_or(0);
        println!();
        for (category, totals) in rows {
            println!(
                "  {category:<width$}  {:>4} questions  {:>7} points",
                totals.questions,
                format_points(totals.points)
            );
        }
    }
    Ok(())
}
