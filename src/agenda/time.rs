//! Parsing and formatting of durations and times of day.

use chrono::NaiveTime;

use crate::timing::TimingError;

/// Parse a manually entered duration.
///
/// Accepts `m:ss` (seconds below 60) or a plain whole number of seconds.
/// Anything else is rejected rather than read as zero.
pub fn parse_manual_time(text: &str) -> Result<f64, TimingError> {
    let text = text.trim();
    let malformed = || {
        TimingError::invalid_input(format!(
            "'{text}' is not a duration (expected m:ss or whole seconds)"
        ))
    };

    if text.is_empty() {
        return Err(malformed());
    }

    match text.split_once(':') {
        Some((minutes, seconds)) => {
            if seconds.len() != 2 {
                return Err(malformed());
            }
            let minutes = parse_digits(minutes).ok_or_else(malformed)?;
            let seconds = parse_digits(seconds).ok_or_else(malformed)?;
            if seconds >= 60 {
                return Err(malformed());
            }
            Ok((minutes * 60 + seconds) as f64)
        }
        None => parse_digits(text).map(|s| s as f64).ok_or_else(malformed),
    }
}

fn parse_digits(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// `m:ss`, rounded to the nearest second.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.round().max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// `Xm YYs`, rounded to the nearest second. Negative values keep their sign.
pub fn format_duration(seconds: f64) -> String {
    let rounded = seconds.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let total = rounded.abs() as u64;
    format!("{}{}m {:02}s", sign, total / 60, total % 60)
}

/// Parse `HH:MM` (or `HH:MM:SS`) as a time of day.
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime, TimingError> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .map_err(|_| TimingError::invalid_input(format!("'{text}' is not a time of day (HH:MM)")))
}

pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
