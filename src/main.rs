use anyhow::Result;
use clap::Parser;
use gavel::{
    app,
    cli::{
        handle_agenda_command, handle_history_command, handle_new_meeting_command,
        handle_report_command, handle_thresholds_command, handle_timer_command, Cli, CliCommand,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(CliCommand::Version) => {
            println!("gavel {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(CliCommand::Thresholds(args)) => {
            handle_thresholds_command(args)?;
            return Ok(());
        }
        Some(CliCommand::Agenda) => {
            handle_agenda_command().await?;
            return Ok(());
        }
        Some(CliCommand::Timer(args)) => {
            handle_timer_command(args).await?;
            return Ok(());
        }
        Some(CliCommand::NewMeeting(args)) => {
            handle_new_meeting_command(args).await?;
            return Ok(());
        }
        Some(CliCommand::Report(args)) => {
            handle_report_command(args).await?;
            return Ok(());
        }
        Some(CliCommand::History(args)) => {
            handle_history_command(args)?;
            return Ok(());
        }
        None => {}
    }

    app::run_service().await
}
