use clap::Command;
use gertaxlaw_cli::*;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    // `--help` and `--version` must not depend on the config file.
    let matches = get_command().get_matches();

    let config = Config::load()?;
    if let Some(path) = config.path() {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    let Some((cmd, subcommand_args)) = matches.subcommand() else {
        unreachable!("subcommand_required is set");
    };
    exec_subcommand(config, cmd, subcommand_args).await?;

    Ok(())
}

fn get_command() -> Command {
    Command::new("gertaxlaw")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate, validate and submit predictions for the GerTaxLaw benchmark")
        .args_conflicts_with_subcommands(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommands(get_subcommands())
        .help_expected(true)
        .after_help(
            "Grading and the bootstrap confidence intervals are computed by the benchmark server.\n\
             Typical flow: `gertaxlaw generate`, then `gertaxlaw submit predictions.json -m <MODEL>`.",
        )
}
