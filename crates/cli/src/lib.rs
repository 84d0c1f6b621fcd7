pub mod api;
mod common_args;
pub mod config;
mod errors;
pub mod generator;
pub mod monitor;
mod subcommands;
pub mod util;

use clap::{ArgMatches, Command};

pub use config::Config;
pub use errors::CliError;
pub use subcommands::*;

pub fn get_subcommands() -> Vec<Command> {
    vec![
        questions::cli(),
        generate::cli(),
        validate::cli(),
        submit::cli(),
        status::cli(),
    ]
}

pub async fn exec_subcommand(config: Config, cmd: &str, args: &ArgMatches) -> Result<(), anyhow::Error> {
    match cmd {
        "questions" => questions::exec(config, args).await,
        "generate" => generate::exec(config, args).await,
        "validate" => validate::exec(config, args).await,
        "submit" => submit::exec(config, args).await,
        "status" => status::exec(config, args).await,
        unknown => Err(anyhow::anyhow!("Invalid subcommand: {}", unknown)),
    }
}
