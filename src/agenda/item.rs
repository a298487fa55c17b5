//! A single timed agenda role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::timing::{
    compute_status, signal_zone, target_seconds, CueRecord, CueSet, QualificationStatus,
    RoleCategory, SignalZone, TimerConfig, TimerPhase, TimingError,
};

use super::time::format_clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    Manual,
    Reset,
}

/// Audit entry for a direct change to elapsed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub at: DateTime<Utc>,
    pub kind: AdjustmentKind,
    pub from_seconds: f64,
    pub to_seconds: f64,
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            AdjustmentKind::Manual => "manual edit",
            AdjustmentKind::Reset => "reset",
        };
        write!(
            f,
            "[{}] {}: {} -> {}",
            self.at.format("%H:%M:%S"),
            what,
            format_clock(self.from_seconds),
            format_clock(self.to_seconds)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub id: Uuid,
    pub role_name: String,
    #[serde(default)]
    pub speaker_name: String,
    pub category: RoleCategory,
    pub target_minutes: f64,
    #[serde(default)]
    pub elapsed_seconds: f64,
    pub status: QualificationStatus,
    pub phase: TimerPhase,
    #[serde(default)]
    pub last_tick: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cues_passed: CueSet,
    #[serde(default)]
    pub cue_log: Vec<CueRecord>,
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AgendaItem {
    pub fn new(
        role_name: impl Into<String>,
        category: RoleCategory,
        target_minutes: f64,
    ) -> Result<Self, TimingError> {
        target_seconds(target_minutes)?;
        Ok(Self {
            id: Uuid::new_v4(),
            role_name: role_name.into(),
            speaker_name: String::new(),
            category,
            target_minutes,
            elapsed_seconds: 0.0,
            status: QualificationStatus::Pending,
            phase: TimerPhase::Idle,
            last_tick: None,
            cues_passed: CueSet::default(),
            cue_log: Vec::new(),
            adjustments: Vec::new(),
            notes: None,
        })
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker_name = speaker.into();
        self
    }

    /// Target rounded to whole seconds.
    pub fn target_seconds(&self) -> i64 {
        (self.target_minutes * 60.0).round() as i64
    }

    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig::from_target_seconds(self.category, self.target_seconds())
    }

    pub fn refresh_status(&mut self) {
        self.status = compute_status(self.elapsed_seconds, &self.timer_config());
    }

    pub fn signal_zone(&self) -> SignalZone {
        signal_zone(self.elapsed_seconds, &self.timer_config())
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn is_session(&self) -> bool {
        self.category == RoleCategory::Session
    }

    /// Time left until the red card, or time past it.
    pub fn countdown(&self) -> Countdown {
        let diff = self.timer_config().red as f64 - self.elapsed_seconds;
        Countdown {
            seconds: diff.abs(),
            overtime: diff < 0.0,
        }
    }

    pub fn set_target_minutes(&mut self, target_minutes: f64) -> Result<(), TimingError> {
        target_seconds(target_minutes)?;
        self.target_minutes = target_minutes;
        self.refresh_status();
        Ok(())
    }

    pub fn set_category(&mut self, category: RoleCategory) {
        self.category = category;
        self.refresh_status();
    }
}

/// Countdown to the red card as shown on the timer face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    pub seconds: f64,
    pub overtime: bool,
}

impl Countdown {
    pub fn label(&self) -> &'static str {
        if self.overtime {
            "OVERTIME"
        } else {
            "REMAINING"
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.seconds.floor() as u64;
        write!(f, "{:02}:{:02}", total / 60, total % 60)
    }
}
