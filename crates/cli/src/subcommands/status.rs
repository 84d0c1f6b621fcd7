use crate::api::ClientApi;
use crate::common_args;
use crate::config::Config;
use crate::monitor::monitor_status;
use clap::ArgAction::SetTrue;
use clap::{Arg, ArgMatches};

pub fn cli() -> clap::Command {
    clap::Command::new("status")
        .about("Show the grading status of a submission")
        .arg(
            Arg::new("submission_id")
                .required(true)
                .help("The submission ID printed by `gertaxlaw submit`"),
        )
        .arg(common_args::server())
        .arg(
            Arg::new("watch")
                .long("watch")
                .short('w')
                .action(SetTrue)
                .help("Keep polling until grading completes or fails"),
        )
}

pub async fn exec(config: Config, args: &ArgMatches) -> Result<(), anyhow::Error> {
    let submission_id = args.get_one::<String>("submission_id").unwrap();
    let server = config.server_url(args.get_one::<String>("server").map(String::as_str));
    let api = ClientApi::new(server)?;

    if args.get_flag("watch") {
        monitor_status(&api, submission_id).await?;
        return Ok(());
    }

    let status = api.status(submission_id).await?;
    println!("Status: {}", status.status);
    if let Some(pos) = status.queue_position {
        println!("Position in queue: {pos}");
    }
    if status.progress.is_some() {
        println!("Progress: {}%", status.progress_percent());
    }
    if let Some(at) = &status.completed_at {
        println!("Completed at: {at}");
    }
    if let Some(err) = &status.error {
        println!("Error: {err}");
    }
    Ok(())
}
