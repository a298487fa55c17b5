//! Post-meeting report: session variance, punctuality and the timer's summary.

pub mod aggregate;
pub mod csv;
pub mod text;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::agenda::{AgendaItem, MeetingInfo, MeetingState};

pub use aggregate::{
    aggregate, is_prepared_speech_role, is_table_topic_role, prepared_speech_stats, punctuality,
    qualification_rate, status_breakdown, table_topics_stats, top_overtime, Deviation,
    Punctuality, PunctualityClass, SessionStats, SessionStatus, StatusBreakdown,
};
pub use csv::CsvReport;
pub use text::render_text;

/// Start delay beyond which the report calls the start late.
pub const LATE_START_MINUTES: i64 = 5;
/// Table Topics overrun that earns its own line.
pub const TABLE_TOPICS_OVERRUN_SECONDS: f64 = 120.0;
pub const TOP_DEVIATIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingReport {
    pub info: MeetingInfo,
    pub report_date: NaiveDate,
    pub punctuality: Option<Punctuality>,
    pub prepared_speeches: SessionStats,
    pub table_topics: SessionStats,
    pub qualification_rate: u32,
    pub breakdown: StatusBreakdown,
    pub top_overtime: Vec<Deviation>,
    pub analysis: Vec<String>,
    pub items: Vec<AgendaItem>,
}

impl MeetingReport {
    pub fn compile(state: &MeetingState, report_date: NaiveDate) -> Self {
        let items = &state.items;
        let punctuality = match (state.info.scheduled_start, state.info.actual_start) {
            (Some(scheduled), Some(actual)) => Some(punctuality(scheduled, actual)),
            _ => None,
        };
        let breakdown = status_breakdown(items);
        let table_topics = table_topics_stats(items);
        let rate = breakdown.qualification_rate();

        Self {
            info: state.info.clone(),
            report_date,
            punctuality,
            prepared_speeches: prepared_speech_stats(items),
            table_topics,
            qualification_rate: rate,
            breakdown,
            top_overtime: top_overtime(items, TOP_DEVIATIONS),
            analysis: analysis_lines(punctuality, rate, &table_topics),
            items: items.clone(),
        }
    }

    pub fn to_csv(&self) -> String {
        CsvReport::from_report(self).render()
    }

    pub fn to_text(&self) -> String {
        render_text(self)
    }
}

fn analysis_lines(
    punctuality: Option<Punctuality>,
    rate: u32,
    table_topics: &SessionStats,
) -> Vec<String> {
    let mut lines = Vec::new();

    let delay = punctuality.map(|p| p.delta_minutes).unwrap_or(0);
    if delay > LATE_START_MINUTES {
        lines.push("The meeting started later than scheduled. A prompt start is encouraged.");
    } else {
        lines.push("Great job starting the meeting on time!");
    }

    if rate >= 80 {
        lines.push("Time management was excellent today, with most speakers qualifying.");
    } else if rate >= 50 {
        lines.push("Time management was fair, but there is room for improvement.");
    } else {
        lines.push(
            "Many roles did not meet the time requirements. Please watch the signals closely.",
        );
    }

    if table_topics.diff_seconds > TABLE_TOPICS_OVERRUN_SECONDS {
        lines.push("Table Topics session significantly exceeded the time limit.");
    }

    lines.into_iter().map(String::from).collect()
}
