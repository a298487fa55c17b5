//! CSV export of the agenda results with a summary block.

use crate::agenda::{format_duration, format_time_of_day, AgendaItem};

use super::MeetingReport;

const HEADER: [&str; 5] = ["Role", "Speaker", "Target Time", "Actual Time", "Status"];

#[derive(Debug)]
pub struct CsvReport {
    rows: Vec<Vec<String>>,
    summary: Vec<(String, String)>,
}

impl CsvReport {
    pub fn from_report(report: &MeetingReport) -> Self {
        let info = &report.info;
        let start = |t: Option<chrono::NaiveTime>| t.map(format_time_of_day).unwrap_or_default();

        Self {
            rows: report.items.iter().map(Self::item_row).collect(),
            summary: vec![
                ("Club".into(), info.club_name.clone()),
                ("Date".into(), report.report_date.format("%Y-%m-%d").to_string()),
                ("Meeting #".into(), info.meeting_number.clone()),
                ("Theme".into(), info.theme.clone()),
                ("Scheduled Start".into(), start(info.scheduled_start)),
                ("Actual Start".into(), start(info.actual_start)),
                (
                    "Overall Qualification Rate".into(),
                    format!("{}%", report.qualification_rate),
                ),
            ],
        }
    }

    fn item_row(item: &AgendaItem) -> Vec<String> {
        vec![
            item.role_name.clone(),
            item.speaker_name.clone(),
            format!("{} min", item.target_minutes),
            format_duration(item.elapsed_seconds),
            item.status.label().to_string(),
        ]
    }

    /// Quote fields holding commas, quotes or newlines.
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn line<I, S>(fields: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields
            .into_iter()
            .map(|f| Self::escape_field(f.as_ref()))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + self.summary.len() + 3);
        lines.push(Self::line(HEADER));
        lines.extend(self.rows.iter().map(|row| Self::line(row)));
        lines.push(String::new());
        lines.push("--- SUMMARY ---".to_string());
        lines.extend(
            self.summary
                .iter()
                .map(|(key, value)| Self::line([key, value])),
        );
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agenda::{MeetingInfo, MeetingState};
    use crate::timing::RoleCategory;
    use chrono::{NaiveDate, NaiveTime};

    fn report() -> MeetingReport {
        let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        let mut state = MeetingState::new(MeetingInfo::new("Harbor Club", date));
        state.info.meeting_number = "412".into();
        state.info.theme = "Bridges, not walls".into();
        state.info.scheduled_start = NaiveTime::from_hms_opt(19, 30, 0);

        let mut speech = AgendaItem::new("Speaker 1", RoleCategory::Speech, 7.0)
            .unwrap()
            .with_speaker("Ann \"Ace\" Lee");
        speech.elapsed_seconds = 421.0;
        speech.refresh_status();
        let pending = AgendaItem::new("Timer Report", RoleCategory::Other, 2.5).unwrap();
        state.items = vec![speech, pending];

        MeetingReport::compile(&state, date)
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(CsvReport::escape_field("plain"), "plain");
        assert_eq!(CsvReport::escape_field("a,b"), "\"a,b\"");
        assert_eq!(CsvReport::escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(CsvReport::escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_render_rows_and_summary() {
        let csv = report().to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Role,Speaker,Target Time,Actual Time,Status");
        assert_eq!(
            lines[1],
            "Speaker 1,\"Ann \"\"Ace\"\" Lee\",7 min,7m 01s,Qualified"
        );
        assert_eq!(lines[2], "Timer Report,,2.5 min,0m 00s,Pending");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "--- SUMMARY ---");
        assert!(lines.contains(&"Club,Harbor Club"));
        assert!(lines.contains(&"Date,2024-05-07"));
        assert!(lines.contains(&"Meeting #,412"));
        assert!(lines.contains(&"Theme,\"Bridges, not walls\""));
        assert!(lines.contains(&"Scheduled Start,19:30"));
        assert!(lines.contains(&"Actual Start,"));
        assert!(lines.contains(&"Overall Qualification Rate,100%"));
    }
}
