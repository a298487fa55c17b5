use anyhow::{anyhow, Result};

use super::args::HistoryCliArgs;
use super::report::compile_today;
use crate::config::Config;
use crate::store::{SnapshotStore, SqliteSnapshotStore};

pub fn handle_history_command(args: HistoryCliArgs) -> Result<()> {
    let config = Config::load()?;
    let store = SqliteSnapshotStore::open_default(config.history.max_snapshots)?;

    if let Some(id) = args.show {
        let snapshot = store
            .get(id)?
            .ok_or_else(|| anyhow!("Saved meeting with ID {} not found", id))?;
        print!("{}", compile_today(&snapshot.state).to_text());
        return Ok(());
    }

    let summaries = store.list(args.limit)?;
    if summaries.is_empty() {
        println!("No saved meetings yet.");
        return Ok(());
    }

    println!("Found {} saved meeting(s):\n", summaries.len());
    for summary in summaries {
        let number = if summary.meeting_number.is_empty() {
            String::new()
        } else {
            format!(" #{}", summary.meeting_number)
        };
        println!(
            "ID: {}  {}{} on {}  ({}/{} roles timed, saved {})",
            summary.id,
            summary.club_name,
            number,
            summary.date.format("%Y-%m-%d"),
            summary.completed,
            summary.total,
            summary.saved_at.format("%Y-%m-%d %H:%M")
        );
    }

    println!("\nTo print a saved report, use: gavel history --show <ID>");
    Ok(())
}
