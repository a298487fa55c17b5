//! Timing state machine for a single agenda item.
//!
//! Lifecycle:
//! idle → running ⇄ paused → confirming stop → finalized
//!
//! The machine borrows one item mutably and never looks at its neighbours, so
//! the controller can drive several session items in the same tick pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agenda::{Adjustment, AdjustmentKind, AgendaItem};

use super::error::TimingError;
use super::status::{CueEvent, CueRecord, QualificationStatus};

/// Phase of a role timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    /// Stop was requested and awaits confirm or cancel. Time does not accrue.
    ConfirmingStop { resume_running: bool },
    Finalized,
}

impl TimerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::ConfirmingStop { .. } => "confirming_stop",
            Self::Finalized => "finalized",
        }
    }

    /// Started but not yet finalized or reset.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            Self::Running | Self::Paused | Self::ConfirmingStop { .. }
        )
    }
}

/// Result of a confirmed stop, handed to whoever records completed roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopOutcome {
    pub elapsed_seconds: f64,
    pub status: QualificationStatus,
    pub cue_log: Vec<CueRecord>,
}

/// Updated item plus whatever the operation fired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    pub item: AgendaItem,
    pub cues: Vec<CueEvent>,
    pub completed: Option<StopOutcome>,
}

pub struct TimingMachine<'a> {
    item: &'a mut AgendaItem,
}

impl<'a> TimingMachine<'a> {
    pub fn new(item: &'a mut AgendaItem) -> Self {
        Self { item }
    }

    pub fn phase(&self) -> TimerPhase {
        self.item.phase
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<Transition, TimingError> {
        self.expect("start", |p| matches!(p, TimerPhase::Idle))?;
        self.item.phase = TimerPhase::Running;
        self.item.last_tick = Some(now);
        Ok(self.settled(Vec::new()))
    }

    /// Add `delta_seconds` of running time and fire any boundary reached.
    pub fn tick(&mut self, delta_seconds: f64) -> Result<Transition, TimingError> {
        self.expect("tick", |p| matches!(p, TimerPhase::Running))?;
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return Err(TimingError::invalid_input(format!(
                "tick delta must be a non-negative number of seconds, got {delta_seconds}"
            )));
        }
        if delta_seconds == 0.0 {
            return Ok(self.settled(Vec::new()));
        }

        self.item.elapsed_seconds += delta_seconds;
        let cues = self.fire_reached_cues();
        self.item.refresh_status();
        Ok(self.settled(cues))
    }

    /// Tick by the wall-clock time since this item's own last tick.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Result<Transition, TimingError> {
        self.expect("tick", |p| matches!(p, TimerPhase::Running))?;
        let delta = match self.item.last_tick {
            Some(last) if now > last => (now - last).num_milliseconds() as f64 / 1000.0,
            _ => 0.0,
        };
        if self.item.last_tick.map_or(true, |last| now > last) {
            self.item.last_tick = Some(now);
        }
        self.tick(delta)
    }

    pub fn pause(&mut self) -> Result<Transition, TimingError> {
        self.expect("pause", |p| matches!(p, TimerPhase::Running))?;
        self.item.phase = TimerPhase::Paused;
        self.item.last_tick = None;
        Ok(self.settled(Vec::new()))
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<Transition, TimingError> {
        self.expect("resume", |p| matches!(p, TimerPhase::Paused))?;
        self.item.phase = TimerPhase::Running;
        self.item.last_tick = Some(now);
        Ok(self.settled(Vec::new()))
    }

    /// Overwrite the elapsed time. Never fires cues; boundaries at or below
    /// the new value count as passed so live timing will not replay them.
    pub fn manual_adjust(
        &mut self,
        elapsed_seconds: f64,
        at: DateTime<Utc>,
    ) -> Result<Transition, TimingError> {
        self.expect("adjust", |p| {
            matches!(p, TimerPhase::Idle | TimerPhase::Paused)
        })?;
        if !elapsed_seconds.is_finite() || elapsed_seconds < 0.0 {
            return Err(TimingError::invalid_input(format!(
                "elapsed time must be a non-negative number of seconds, got {elapsed_seconds}"
            )));
        }

        let previous = self.item.elapsed_seconds;
        self.item.elapsed_seconds = elapsed_seconds;

        if elapsed_seconds > 0.0 {
            let config = self.item.timer_config();
            for cue in CueEvent::ALL {
                if elapsed_seconds >= cue.boundary(&config) as f64 {
                    self.item.cues_passed.insert(cue);
                }
            }
        }

        self.item.adjustments.push(Adjustment {
            at,
            kind: AdjustmentKind::Manual,
            from_seconds: previous,
            to_seconds: elapsed_seconds,
        });
        self.item.refresh_status();
        Ok(self.settled(Vec::new()))
    }

    pub fn request_stop(&mut self) -> Result<Transition, TimingError> {
        let resume_running = match self.item.phase {
            TimerPhase::Running => true,
            TimerPhase::Paused => false,
            other => return Err(Self::rejected("stop", other)),
        };
        self.item.phase = TimerPhase::ConfirmingStop { resume_running };
        self.item.last_tick = None;
        Ok(self.settled(Vec::new()))
    }

    pub fn confirm_stop(&mut self) -> Result<Transition, TimingError> {
        self.expect("confirm stop", |p| {
            matches!(p, TimerPhase::ConfirmingStop { .. })
        })?;
        self.item.phase = TimerPhase::Finalized;
        self.item.refresh_status();

        let outcome = StopOutcome {
            elapsed_seconds: self.item.elapsed_seconds,
            status: self.item.status,
            cue_log: self.item.cue_log.clone(),
        };
        let mut transition = self.settled(Vec::new());
        transition.completed = Some(outcome);
        Ok(transition)
    }

    /// Back out of a stop request. Elapsed time is unchanged; a running timer
    /// restarts its reference timestamp at `now`.
    pub fn cancel_stop(&mut self, now: DateTime<Utc>) -> Result<Transition, TimingError> {
        let TimerPhase::ConfirmingStop { resume_running } = self.item.phase else {
            return Err(Self::rejected("cancel stop", self.item.phase));
        };
        if resume_running {
            self.item.phase = TimerPhase::Running;
            self.item.last_tick = Some(now);
        } else {
            self.item.phase = TimerPhase::Paused;
        }
        Ok(self.settled(Vec::new()))
    }

    /// Back to idle from any phase. The caller is responsible for having the
    /// operator confirm first.
    pub fn reset(&mut self, at: DateTime<Utc>) -> Result<Transition, TimingError> {
        let previous = self.item.elapsed_seconds;
        self.item.phase = TimerPhase::Idle;
        self.item.elapsed_seconds = 0.0;
        self.item.last_tick = None;
        self.item.cues_passed.clear();
        self.item.cue_log.clear();
        self.item.adjustments.push(Adjustment {
            at,
            kind: AdjustmentKind::Reset,
            from_seconds: previous,
            to_seconds: 0.0,
        });
        self.item.refresh_status();
        Ok(self.settled(Vec::new()))
    }

    /// Make a finalized item editable again.
    pub fn reopen(&mut self) -> Result<Transition, TimingError> {
        self.expect("reopen", |p| matches!(p, TimerPhase::Finalized))?;
        self.item.phase = TimerPhase::Paused;
        Ok(self.settled(Vec::new()))
    }

    fn fire_reached_cues(&mut self) -> Vec<CueEvent> {
        let config = self.item.timer_config();
        let elapsed = self.item.elapsed_seconds;
        let mut fired = Vec::new();

        for cue in CueEvent::ALL {
            if self.item.cues_passed.contains(cue) || elapsed < cue.boundary(&config) as f64 {
                continue;
            }
            self.item.cues_passed.insert(cue);
            self.item.cue_log.push(CueRecord {
                cue,
                elapsed_seconds: elapsed,
            });
            fired.push(cue);
        }

        fired
    }

    fn expect(
        &self,
        operation: &'static str,
        allowed: impl Fn(TimerPhase) -> bool,
    ) -> Result<(), TimingError> {
        if allowed(self.item.phase) {
            Ok(())
        } else {
            Err(Self::rejected(operation, self.item.phase))
        }
    }

    fn rejected(operation: &'static str, phase: TimerPhase) -> TimingError {
        TimingError::InvalidTransition {
            operation,
            phase: phase.as_str(),
        }
    }

    fn settled(&self, cues: Vec<CueEvent>) -> Transition {
        Transition {
            item: self.item.clone(),
            cues,
            completed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::RoleCategory;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 7, 19, 30, 0).unwrap()
    }

    fn speech() -> AgendaItem {
        AgendaItem::new("Speaker 1", RoleCategory::Speech, 7.0).unwrap()
    }

    #[test]
    fn test_start_requires_idle() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();
        assert_eq!(machine.phase(), TimerPhase::Running);

        let err = machine.start(t0()).unwrap_err();
        assert_eq!(
            err,
            TimingError::InvalidTransition {
                operation: "start",
                phase: "running"
            }
        );
    }

    #[test]
    fn test_resume_while_idle_is_rejected() {
        let mut item = speech();
        let err = TimingMachine::new(&mut item).resume(t0()).unwrap_err();
        assert!(matches!(err, TimingError::InvalidTransition { .. }));
        assert_eq!(item.phase, TimerPhase::Idle);
    }

    #[test]
    fn test_tick_accumulates_and_updates_status() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();
        machine.tick(100.0).unwrap();
        let t = machine.tick(250.0).unwrap();
        assert_eq!(t.item.elapsed_seconds, 350.0);
        assert_eq!(t.item.status, QualificationStatus::Qualified);
    }

    #[test]
    fn test_zero_tick_is_idempotent() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();
        machine.tick(310.0).unwrap();
        let before = machine.tick(0.0).unwrap();
        let after = machine.tick(0.0).unwrap();
        assert!(after.cues.is_empty());
        assert_eq!(before.item.elapsed_seconds, after.item.elapsed_seconds);
        assert_eq!(before.item.status, after.item.status);
        assert_eq!(after.item.cue_log.len(), 1);
    }

    #[test]
    fn test_zero_tick_does_not_fire_negative_boundaries() {
        let mut item = AgendaItem::new("Short", RoleCategory::Speech, 0.5).unwrap();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();
        assert!(machine.tick(0.0).unwrap().cues.is_empty());

        let t = machine.tick(1.0).unwrap();
        assert_eq!(t.cues, vec![CueEvent::GreenEntered, CueEvent::YellowEntered]);
    }

    #[test]
    fn test_single_tick_fires_all_cues_in_order() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();
        let t = machine.tick(500.0).unwrap();
        assert_eq!(t.cues, CueEvent::ALL.to_vec());
        assert!(machine.tick(100.0).unwrap().cues.is_empty());
    }

    #[test]
    fn test_cues_fire_once_across_many_ticks() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();

        let mut fired = Vec::new();
        for _ in 0..500 {
            fired.extend(machine.tick(1.0).unwrap().cues);
        }
        assert_eq!(fired, CueEvent::ALL.to_vec());
        let log: Vec<_> = item.cue_log.iter().map(|r| r.elapsed_seconds).collect();
        assert_eq!(log, vec![300.0, 360.0, 420.0, 450.0]);
    }

    #[test]
    fn test_tick_rejects_bad_delta_and_non_running() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        assert!(matches!(
            machine.tick(1.0),
            Err(TimingError::InvalidTransition { .. })
        ));
        machine.start(t0()).unwrap();
        assert!(matches!(
            machine.tick(-1.0),
            Err(TimingError::InvalidInput(_))
        ));
        assert!(matches!(
            machine.tick(f64::NAN),
            Err(TimingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_tick_at_uses_wall_clock_delta() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();
        machine.tick_at(t0() + Duration::seconds(1)).unwrap();
        // A delayed tick still counts the full gap.
        let t = machine.tick_at(t0() + Duration::milliseconds(3500)).unwrap();
        assert_eq!(t.item.elapsed_seconds, 3.5);
        // Clock going backwards adds nothing.
        let t = machine.tick_at(t0()).unwrap();
        assert_eq!(t.item.elapsed_seconds, 3.5);
    }

    #[test]
    fn test_paused_time_does_not_count() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();
        machine.tick_at(t0() + Duration::seconds(10)).unwrap();
        machine.pause().unwrap();
        machine.resume(t0() + Duration::seconds(100)).unwrap();
        let t = machine.tick_at(t0() + Duration::seconds(105)).unwrap();
        assert_eq!(t.item.elapsed_seconds, 15.0);
    }

    #[test]
    fn test_manual_adjust_never_fires_cues() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        let t = machine.manual_adjust(455.0, t0()).unwrap();
        assert!(t.cues.is_empty());
        assert_eq!(t.item.status, QualificationStatus::Overtime);
        assert_eq!(t.item.adjustments.len(), 1);
        assert_eq!(t.item.adjustments[0].from_seconds, 0.0);
        assert_eq!(t.item.adjustments[0].to_seconds, 455.0);

        // Boundaries below the adjusted value stay silent once live again.
        machine.start(t0()).unwrap();
        assert!(machine.tick(5.0).unwrap().cues.is_empty());
    }

    #[test]
    fn test_manual_adjust_down_does_not_rearm() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();
        assert_eq!(machine.tick(310.0).unwrap().cues, vec![CueEvent::GreenEntered]);
        machine.pause().unwrap();
        machine.manual_adjust(100.0, t0()).unwrap();
        machine.resume(t0()).unwrap();
        let t = machine.tick(270.0).unwrap();
        assert_eq!(t.cues, vec![CueEvent::YellowEntered]);
    }

    #[test]
    fn test_manual_adjust_rejected_while_running() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();
        assert!(matches!(
            machine.manual_adjust(10.0, t0()),
            Err(TimingError::InvalidTransition { .. })
        ));
        machine.pause().unwrap();
        assert!(matches!(
            machine.manual_adjust(-3.0, t0()),
            Err(TimingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_stop_confirm_returns_outcome() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();
        machine.tick(419.0).unwrap();
        machine.request_stop().unwrap();
        assert!(matches!(
            machine.tick(1.0),
            Err(TimingError::InvalidTransition { .. })
        ));

        let t = machine.confirm_stop().unwrap();
        let outcome = t.completed.unwrap();
        assert_eq!(outcome.elapsed_seconds, 419.0);
        assert_eq!(outcome.status, QualificationStatus::Qualified);
        assert_eq!(outcome.cue_log.len(), 2);
        assert_eq!(machine.phase(), TimerPhase::Finalized);

        assert!(machine.pause().is_err());
        assert!(machine.manual_adjust(1.0, t0()).is_err());
    }

    #[test]
    fn test_cancel_stop_restores_prior_phase() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();
        machine.tick(30.0).unwrap();
        machine.request_stop().unwrap();
        let t = machine.cancel_stop(t0() + Duration::seconds(60)).unwrap();
        assert_eq!(t.item.phase, TimerPhase::Running);
        assert_eq!(t.item.elapsed_seconds, 30.0);
        let t = machine.tick_at(t0() + Duration::seconds(62)).unwrap();
        assert_eq!(t.item.elapsed_seconds, 32.0);

        machine.pause().unwrap();
        machine.request_stop().unwrap();
        let t = machine.cancel_stop(t0()).unwrap();
        assert_eq!(t.item.phase, TimerPhase::Paused);
    }

    #[test]
    fn test_stop_requires_live_timer() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        assert!(machine.request_stop().is_err());
        assert!(machine.confirm_stop().is_err());
        assert!(machine.cancel_stop(t0()).is_err());
    }

    #[test]
    fn test_reset_from_finalized() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();
        machine.tick(460.0).unwrap();
        machine.request_stop().unwrap();
        machine.confirm_stop().unwrap();

        let t = machine.reset(t0()).unwrap();
        assert_eq!(t.item.phase, TimerPhase::Idle);
        assert_eq!(t.item.elapsed_seconds, 0.0);
        assert_eq!(t.item.status, QualificationStatus::Pending);
        assert!(t.item.cue_log.is_empty());
        assert_eq!(t.item.adjustments.last().unwrap().kind, AdjustmentKind::Reset);

        // Cues are armed again after a reset.
        machine.start(t0()).unwrap();
        assert_eq!(machine.tick(301.0).unwrap().cues, vec![CueEvent::GreenEntered]);
    }

    #[test]
    fn test_reopen_allows_correction() {
        let mut item = speech();
        let mut machine = TimingMachine::new(&mut item);
        machine.start(t0()).unwrap();
        machine.tick(200.0).unwrap();
        machine.request_stop().unwrap();
        machine.confirm_stop().unwrap();
        assert!(machine.reopen().is_ok());
        let t = machine.manual_adjust(330.0, t0()).unwrap();
        assert_eq!(t.item.status, QualificationStatus::Qualified);
        assert!(machine.reopen().is_err());
    }

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_string(&TimerPhase::Running).unwrap();
        assert_eq!(json, "\"running\"");
        let phase = TimerPhase::ConfirmingStop {
            resume_running: true,
        };
        let back: TimerPhase = serde_json::from_str(&serde_json::to_string(&phase).unwrap()).unwrap();
        assert_eq!(back, phase);
        assert!(phase.is_live());
        assert!(!TimerPhase::Finalized.is_live());
    }
}
