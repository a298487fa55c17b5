//! Plain-text report for the terminal.

use std::fmt::Write;

use crate::agenda::{format_duration, format_time_of_day};

use super::{MeetingReport, SessionStats};

fn session_line(name: &str, stats: &SessionStats) -> String {
    let sign = if stats.diff_seconds > 0.0 { "+" } else { "" };
    format!(
        "{:<20} {:>2} roles  target {:>8}  actual {:>8}  ({}{})  {}",
        name,
        stats.count,
        format_duration(stats.target_seconds),
        format_duration(stats.actual_seconds),
        sign,
        format_duration(stats.diff_seconds),
        stats.status
    )
}

pub fn render_text(report: &MeetingReport) -> String {
    let mut out = String::new();
    let info = &report.info;

    let _ = writeln!(out, "{} - Timer's Report", info.club_name);
    let _ = writeln!(out, "Date: {}", report.report_date.format("%Y-%m-%d"));
    if !info.meeting_number.is_empty() {
        let _ = writeln!(out, "Meeting #{}", info.meeting_number);
    }
    if !info.theme.is_empty() {
        let _ = writeln!(out, "Theme: {}", info.theme);
    }

    let start = |t: Option<chrono::NaiveTime>| {
        t.map(format_time_of_day)
            .unwrap_or_else(|| "--:--".to_string())
    };
    let punctuality = report
        .punctuality
        .map(|p| p.label())
        .unwrap_or_else(|| "n/a".to_string());
    let _ = writeln!(
        out,
        "Start: scheduled {}, actual {} ({})",
        start(info.scheduled_start),
        start(info.actual_start),
        punctuality
    );
    out.push('\n');

    let _ = writeln!(out, "{}", session_line("Prepared speeches", &report.prepared_speeches));
    let _ = writeln!(out, "{}", session_line("Table Topics", &report.table_topics));
    let _ = writeln!(
        out,
        "Qualification rate: {}% ({} qualified, {} overtime, {} undertime)",
        report.qualification_rate,
        report.breakdown.qualified,
        report.breakdown.overtime,
        report.breakdown.undertime
    );

    if !report.top_overtime.is_empty() {
        out.push_str("\nLongest overruns:\n");
        for (rank, dev) in report.top_overtime.iter().enumerate() {
            let speaker = if dev.speaker_name.is_empty() {
                String::new()
            } else {
                format!(" ({})", dev.speaker_name)
            };
            let _ = writeln!(
                out,
                "  {}. {}{}: +{}",
                rank + 1,
                dev.role_name,
                speaker,
                format_duration(dev.deviation_seconds)
            );
        }
    }

    out.push_str("\nRoles:\n");
    for item in &report.items {
        let _ = writeln!(
            out,
            "  {:<32} {:<16} {:>5} min  {:>8}  {}",
            item.role_name,
            item.speaker_name,
            item.target_minutes,
            format_duration(item.elapsed_seconds),
            item.status
        );
    }

    out.push_str("\nAnalysis:\n");
    for line in &report.analysis {
        let _ = writeln!(out, "  - {}", line);
    }

    out
}
