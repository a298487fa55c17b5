//! Session aggregator.
//!
//! Folds completed agenda items into per-session variance figures, the overall
//! qualification rate and meeting punctuality. Pending items never count.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::agenda::AgendaItem;
use crate::timing::{QualificationStatus, RoleCategory};

/// Variance beyond which a session counts as over or under time.
pub const SESSION_TOLERANCE_SECONDS: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    OnTime,
    Overtime,
    Undertime,
}

impl SessionStatus {
    pub fn from_variance(diff_seconds: f64) -> Self {
        if diff_seconds > SESSION_TOLERANCE_SECONDS {
            Self::Overtime
        } else if diff_seconds < -SESSION_TOLERANCE_SECONDS {
            Self::Undertime
        } else {
            Self::OnTime
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OnTime => "On Time",
            Self::Overtime => "Overtime",
            Self::Undertime => "Undertime",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub count: usize,
    pub target_seconds: f64,
    pub actual_seconds: f64,
    /// actual − target
    pub diff_seconds: f64,
    pub status: SessionStatus,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            count: 0,
            target_seconds: 0.0,
            actual_seconds: 0.0,
            diff_seconds: 0.0,
            status: SessionStatus::OnTime,
        }
    }
}

impl SessionStats {
    fn from_totals(count: usize, target_seconds: f64, actual_seconds: f64) -> Self {
        let diff_seconds = actual_seconds - target_seconds;
        Self {
            count,
            target_seconds,
            actual_seconds,
            diff_seconds,
            status: SessionStatus::from_variance(diff_seconds),
        }
    }
}

/// Sum every completed item accepted by `predicate`.
pub fn aggregate<F>(items: &[AgendaItem], predicate: F) -> SessionStats
where
    F: Fn(&AgendaItem) -> bool,
{
    let (count, target, actual) = items
        .iter()
        .filter(|i| !i.status.is_pending())
        .filter(|i| predicate(i))
        .fold((0usize, 0.0f64, 0.0f64), |(count, target, actual), item| {
            (
                count + 1,
                target + item.target_seconds() as f64,
                actual + item.elapsed_seconds,
            )
        });

    SessionStats::from_totals(count, target, actual)
}

/// Prepared speeches and their evaluations (but not the general evaluator).
pub fn is_prepared_speech_role(item: &AgendaItem) -> bool {
    let name = item.role_name.to_lowercase();
    item.category == RoleCategory::Speech
        || (name.contains("evaluator") && !name.contains("general"))
}

/// Individual Table Topics turns.
pub fn is_table_topic_role(item: &AgendaItem) -> bool {
    item.category == RoleCategory::TableTopic
        || (item.role_name.to_lowercase().contains("table topic") && !item.is_session())
}

pub fn prepared_speech_stats(items: &[AgendaItem]) -> SessionStats {
    aggregate(items, is_prepared_speech_role)
}

/// Table Topics figures.
///
/// A session-category item with time on it stands for the whole segment;
/// otherwise the individual turns are summed.
pub fn table_topics_stats(items: &[AgendaItem]) -> SessionStats {
    match items.iter().find(|i| i.is_session()) {
        Some(session) if session.elapsed_seconds > 0.0 => SessionStats::from_totals(
            1,
            session.target_seconds() as f64,
            session.elapsed_seconds,
        ),
        _ => aggregate(items, is_table_topic_role),
    }
}

/// Per-status counts over completed items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub qualified: usize,
    pub overtime: usize,
    pub undertime: usize,
}

impl StatusBreakdown {
    pub fn completed(&self) -> usize {
        self.qualified + self.overtime + self.undertime
    }

    /// `round(100 * qualified / completed)`, 0 when nothing is completed.
    pub fn qualification_rate(&self) -> u32 {
        let completed = self.completed();
        if completed == 0 {
            return 0;
        }
        (100.0 * self.qualified as f64 / completed as f64).round() as u32
    }
}

pub fn status_breakdown(items: &[AgendaItem]) -> StatusBreakdown {
    items
        .iter()
        .fold(StatusBreakdown::default(), |mut acc, item| {
            match item.status {
                QualificationStatus::Qualified => acc.qualified += 1,
                QualificationStatus::Overtime => acc.overtime += 1,
                QualificationStatus::Undertime => acc.undertime += 1,
                QualificationStatus::Pending => {}
            }
            acc
        })
}

pub fn qualification_rate(items: &[AgendaItem]) -> u32 {
    status_breakdown(items).qualification_rate()
}

/// An overtime role and how far it ran past its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    pub role_name: String,
    pub speaker_name: String,
    pub target_seconds: f64,
    pub actual_seconds: f64,
    pub deviation_seconds: f64,
}

/// The `limit` overtime roles that ran furthest past target, worst first.
pub fn top_overtime(items: &[AgendaItem], limit: usize) -> Vec<Deviation> {
    let mut deviations: Vec<Deviation> = items
        .iter()
        .filter(|i| i.status == QualificationStatus::Overtime)
        .map(|i| {
            let target = i.target_seconds() as f64;
            Deviation {
                role_name: i.role_name.clone(),
                speaker_name: i.speaker_name.clone(),
                target_seconds: target,
                actual_seconds: i.elapsed_seconds,
                deviation_seconds: (i.elapsed_seconds - target).abs(),
            }
        })
        .collect();

    deviations.sort_by(|a, b| b.deviation_seconds.total_cmp(&a.deviation_seconds));
    deviations.truncate(limit);
    deviations
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunctualityClass {
    Early,
    OnTime,
    Delayed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punctuality {
    /// actual − scheduled, floored to whole minutes
    pub delta_minutes: i64,
    pub classification: PunctualityClass,
}

impl Punctuality {
    pub fn label(&self) -> String {
        match self.classification {
            PunctualityClass::OnTime => "On Time".to_string(),
            PunctualityClass::Delayed => format!("Delayed {} min", self.delta_minutes),
            PunctualityClass::Early => format!("Early {} min", self.delta_minutes.abs()),
        }
    }
}

/// Compare scheduled and actual start on the same day. No tolerance band:
/// only an exact match is on time.
pub fn punctuality(scheduled: NaiveTime, actual: NaiveTime) -> Punctuality {
    let delta_minutes = (actual - scheduled).num_seconds().div_euclid(60);
    let classification = match delta_minutes {
        d if d > 0 => PunctualityClass::Delayed,
        d if d < 0 => PunctualityClass::Early,
        _ => PunctualityClass::OnTime,
    };
    Punctuality {
        delta_minutes,
        classification,
    }
}
