use clap::Arg;
use clap::ArgAction::SetTrue;
use std::path::PathBuf;

pub fn server() -> Arg {
    Arg::new("server")
        .long("server")
        .short('s')
        .env("GERTAXLAW_SERVER")
        .help("Base URL of the benchmark server")
        .long_help(format!(
            "Base URL of the benchmark server. Defaults to `server` from the config file, then {}",
            crate::config::DEFAULT_SERVER
        ))
}

pub fn key() -> Arg {
    Arg::new("key")
        .long("key")
        .short('k')
        .env("GERTAXLAW_KEY")
        .hide_env_values(true)
        .help("Submission key")
}

pub fn questions() -> Arg {
    Arg::new("questions")
        .long("questions")
        .short('q')
        .env("GERTAXLAW_QUESTIONS")
        .value_parser(clap::value_parser!(PathBuf))
        .help("Path to benchmark-questions.json")
}

pub fn predictions_file() -> Arg {
    Arg::new("predictions_file")
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .help("Path to the predictions JSON file")
}

pub fn strict() -> Arg {
    Arg::new("strict")
        .long("strict")
        .action(SetTrue)
        .help("Treat empty, missing or unknown answers as errors")
}
