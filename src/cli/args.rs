use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gavel")]
#[command(about = "Role timer for Toastmasters-style meetings", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Print version information
    Version,
    /// Show green/yellow/red/bell times for a role
    Thresholds(ThresholdsCliArgs),
    /// Show the current agenda with timer state
    Agenda,
    /// Control a role's timer
    Timer(TimerCliArgs),
    /// Archive the current meeting and start a new one
    NewMeeting(NewMeetingCliArgs),
    /// Show the timer's report or export it as CSV
    Report(ReportCliArgs),
    /// List saved meetings
    History(HistoryCliArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ThresholdsCliArgs {
    /// Target time in minutes
    pub minutes: f64,
    /// Role category: speech, table_topic, other or session
    #[arg(short, long, default_value = "other")]
    pub category: String,
}

#[derive(ClapArgs, Debug)]
pub struct TimerCliArgs {
    /// start, pause, resume, stop, confirm, cancel, reset, reopen or adjust
    pub action: String,
    /// Agenda position (1-based), item id, or part of the role name
    pub item: String,
    /// New elapsed time for `adjust`, as m:ss or whole seconds
    #[arg(short, long)]
    pub time: Option<String>,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(ClapArgs, Debug)]
pub struct NewMeetingCliArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ReportCliArgs {
    /// Write the CSV export to this file instead of printing the report
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct HistoryCliArgs {
    /// Maximum number of results to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
    /// Print the report for this saved meeting
    #[arg(short, long)]
    pub show: Option<i64>,
}
