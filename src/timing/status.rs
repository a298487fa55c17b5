//! Qualification status, signal zones and cue events.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::thresholds::TimerConfig;

/// Outcome of a timed role, derived purely from elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualificationStatus {
    Pending,
    Undertime,
    Qualified,
    Overtime,
}

impl QualificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Undertime => "undertime",
            Self::Qualified => "qualified",
            Self::Overtime => "overtime",
        }
    }

    /// Human label used in reports and CSV exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Undertime => "Undertime",
            Self::Qualified => "Qualified",
            Self::Overtime => "Overtime",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for QualificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Qualification rule: green up to (not including) the bell is acceptable.
pub fn compute_status(elapsed_seconds: f64, config: &TimerConfig) -> QualificationStatus {
    if elapsed_seconds <= 0.0 || elapsed_seconds.is_nan() {
        return QualificationStatus::Pending;
    }
    if elapsed_seconds >= config.bell as f64 {
        QualificationStatus::Overtime
    } else if elapsed_seconds >= config.green as f64 {
        QualificationStatus::Qualified
    } else {
        QualificationStatus::Undertime
    }
}

/// Card currently shown to the speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalZone {
    None,
    Green,
    Yellow,
    Red,
    Bell,
}

impl SignalZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Bell => "bell",
        }
    }

    /// Instruction text for the zone.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::None => "Timing...",
            Self::Green => "GREEN CARD",
            Self::Yellow => "YELLOW CARD",
            Self::Red => "RED CARD",
            Self::Bell => "BELL RUNG",
        }
    }
}

/// Highest boundary reached by `elapsed_seconds`.
///
/// Nothing is shown before the clock has moved, even when short targets push
/// the green boundary below zero.
pub fn signal_zone(elapsed_seconds: f64, config: &TimerConfig) -> SignalZone {
    if elapsed_seconds <= 0.0 || elapsed_seconds.is_nan() {
        return SignalZone::None;
    }
    CueEvent::ALL
        .iter()
        .rev()
        .find(|cue| elapsed_seconds >= cue.boundary(config) as f64)
        .map(|cue| cue.zone())
        .unwrap_or(SignalZone::None)
}

/// One-shot signal fired the first time live timing reaches a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueEvent {
    GreenEntered,
    YellowEntered,
    RedEntered,
    BellEntered,
}

impl CueEvent {
    /// Ascending boundary order.
    pub const ALL: [CueEvent; 4] = [
        Self::GreenEntered,
        Self::YellowEntered,
        Self::RedEntered,
        Self::BellEntered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GreenEntered => "green_entered",
            Self::YellowEntered => "yellow_entered",
            Self::RedEntered => "red_entered",
            Self::BellEntered => "bell_entered",
        }
    }

    pub fn boundary(&self, config: &TimerConfig) -> i64 {
        match self {
            Self::GreenEntered => config.green,
            Self::YellowEntered => config.yellow,
            Self::RedEntered => config.red,
            Self::BellEntered => config.bell,
        }
    }

    pub fn zone(&self) -> SignalZone {
        match self {
            Self::GreenEntered => SignalZone::Green,
            Self::YellowEntered => SignalZone::Yellow,
            Self::RedEntered => SignalZone::Red,
            Self::BellEntered => SignalZone::Bell,
        }
    }

    fn bit(&self) -> u8 {
        match self {
            Self::GreenEntered => 0b0001,
            Self::YellowEntered => 0b0010,
            Self::RedEntered => 0b0100,
            Self::BellEntered => 0b1000,
        }
    }
}

impl fmt::Display for CueEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of boundaries already passed during the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CueSet(u8);

impl CueSet {
    pub fn contains(&self, cue: CueEvent) -> bool {
        self.0 & cue.bit() != 0
    }

    pub fn insert(&mut self, cue: CueEvent) {
        self.0 |= cue.bit();
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// A cue together with the elapsed time at which it fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CueRecord {
    pub cue: CueEvent,
    pub elapsed_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::thresholds::{compute_thresholds, RoleCategory};

    fn speech7() -> TimerConfig {
        compute_thresholds(RoleCategory::Speech, 7.0).unwrap()
    }

    #[test]
    fn test_speech_scenario() {
        let config = speech7();
        assert_eq!(compute_status(419.0, &config), QualificationStatus::Qualified);
        assert_eq!(compute_status(451.0, &config), QualificationStatus::Overtime);
        assert_eq!(compute_status(299.0, &config), QualificationStatus::Undertime);
        assert_eq!(compute_status(0.0, &config), QualificationStatus::Pending);
    }

    #[test]
    fn test_boundaries_are_inclusive_below() {
        let config = speech7();
        assert_eq!(compute_status(300.0, &config), QualificationStatus::Qualified);
        assert_eq!(compute_status(449.9, &config), QualificationStatus::Qualified);
        assert_eq!(compute_status(450.0, &config), QualificationStatus::Overtime);
        assert_eq!(compute_status(0.5, &config), QualificationStatus::Undertime);
    }

    #[test]
    fn test_status_is_monotonic() {
        let config = compute_thresholds(RoleCategory::Other, 2.0).unwrap();
        let mut last = QualificationStatus::Pending;
        let rank = |s: QualificationStatus| match s {
            QualificationStatus::Pending => 0,
            QualificationStatus::Undertime => 1,
            QualificationStatus::Qualified => 2,
            QualificationStatus::Overtime => 3,
        };
        for tenths in 0..2000 {
            let status = compute_status(tenths as f64 / 10.0, &config);
            assert!(rank(status) >= rank(last));
            last = status;
        }
        assert_eq!(last, QualificationStatus::Overtime);
    }

    #[test]
    fn test_negative_green_still_pending_at_zero() {
        let config = compute_thresholds(RoleCategory::Speech, 0.5).unwrap();
        assert_eq!(compute_status(0.0, &config), QualificationStatus::Pending);
        assert_eq!(compute_status(1.0, &config), QualificationStatus::Qualified);
    }

    #[test]
    fn test_signal_zones() {
        let config = speech7();
        assert_eq!(signal_zone(0.0, &config), SignalZone::None);
        assert_eq!(signal_zone(120.0, &config), SignalZone::None);
        assert_eq!(signal_zone(300.0, &config), SignalZone::Green);
        assert_eq!(signal_zone(365.0, &config), SignalZone::Yellow);
        assert_eq!(signal_zone(420.0, &config), SignalZone::Red);
        assert_eq!(signal_zone(600.0, &config), SignalZone::Bell);
        assert_eq!(SignalZone::Bell.instruction(), "BELL RUNG");
    }

    #[test]
    fn test_cue_set() {
        let mut set = CueSet::default();
        assert!(set.is_empty());
        set.insert(CueEvent::RedEntered);
        assert!(set.contains(CueEvent::RedEntered));
        assert!(!set.contains(CueEvent::GreenEntered));
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&QualificationStatus::Qualified).unwrap();
        assert_eq!(json, "\"qualified\"");
        let cue: CueEvent = serde_json::from_str("\"bell_entered\"").unwrap();
        assert_eq!(cue, CueEvent::BellEntered);
    }
}
