use anyhow::{Context, Result};
use chrono::Local;

use super::args::ReportCliArgs;
use super::client::ServiceClient;
use crate::report::MeetingReport;

pub async fn handle_report_command(args: ReportCliArgs) -> Result<()> {
    let client = ServiceClient::from_config();

    if let Some(path) = args.csv {
        let csv = client.get_text("/report/csv").await?;
        std::fs::write(&path, csv)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("Report exported to {}", path.display());
        return Ok(());
    }

    let report: MeetingReport = client.get("/report").await?;
    print!("{}", report.to_text());
    Ok(())
}

/// Compile a report locally, dated today.
pub fn compile_today(state: &crate::agenda::MeetingState) -> MeetingReport {
    MeetingReport::compile(state, Local::now().date_naive())
}
