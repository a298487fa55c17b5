//! Threshold calculator.
//!
//! Maps a role category and target duration onto the four signal boundaries
//! shown to a speaker: green, yellow, red and the overtime bell.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::TimingError;

/// Seconds past the red card before the bell rings.
pub const BELL_GRACE_SECONDS: i64 = 30;

/// Kind of agenda role. Selects the threshold formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    Speech,
    TableTopic,
    Other,
    /// A whole block (e.g. the Table Topics segment) timed as one unit.
    Session,
}

impl RoleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Speech => "speech",
            Self::TableTopic => "table_topic",
            Self::Other => "other",
            Self::Session => "session",
        }
    }

    /// (seconds before red for green, seconds before red for yellow)
    fn lead_times(&self) -> (i64, i64) {
        match self {
            Self::Speech => (120, 60),
            Self::TableTopic | Self::Other | Self::Session => (60, 30),
        }
    }
}

impl fmt::Display for RoleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleCategory {
    type Err = TimingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "speech" => Ok(Self::Speech),
            "table_topic" | "tabletopic" | "table_topics" => Ok(Self::TableTopic),
            "other" => Ok(Self::Other),
            "session" => Ok(Self::Session),
            other => Err(TimingError::invalid_input(format!(
                "unknown role category '{other}'"
            ))),
        }
    }
}

/// Signal boundaries in seconds of elapsed time.
///
/// Offsets can be negative for very short targets. Comparisons use the raw
/// values; only [`TimerConfig::clamped`] is meant for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub green: i64,
    pub yellow: i64,
    pub red: i64,
    pub bell: i64,
}

impl TimerConfig {
    /// Build the boundaries from an already-validated target in seconds.
    pub fn from_target_seconds(category: RoleCategory, target_seconds: i64) -> Self {
        let (green_lead, yellow_lead) = category.lead_times();
        Self {
            green: target_seconds - green_lead,
            yellow: target_seconds - yellow_lead,
            red: target_seconds,
            bell: target_seconds + BELL_GRACE_SECONDS,
        }
    }

    /// Boundaries floored at zero for display.
    pub fn clamped(&self) -> Self {
        Self {
            green: self.green.max(0),
            yellow: self.yellow.max(0),
            red: self.red.max(0),
            bell: self.bell.max(0),
        }
    }
}

/// Convert a target in minutes to whole seconds.
///
/// Rejects non-finite and non-positive targets, and targets that round to zero
/// seconds.
pub fn target_seconds(target_minutes: f64) -> Result<i64, TimingError> {
    if !target_minutes.is_finite() || target_minutes <= 0.0 {
        return Err(TimingError::invalid_input(format!(
            "target duration must be a positive number of minutes, got {target_minutes}"
        )));
    }
    let seconds = (target_minutes * 60.0).round();
    if seconds < 1.0 || seconds > i64::MAX as f64 {
        return Err(TimingError::invalid_input(format!(
            "target duration {target_minutes} min is out of range"
        )));
    }
    Ok(seconds as i64)
}

/// Compute the signal boundaries for a role.
pub fn compute_thresholds(
    category: RoleCategory,
    target_minutes: f64,
) -> Result<TimerConfig, TimingError> {
    let target = target_seconds(target_minutes)?;
    Ok(TimerConfig::from_target_seconds(category, target))
}
