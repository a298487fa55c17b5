//! Meeting controller.
//!
//! Owns the meeting state and is the only thing that mutates it. Commands and
//! ticks come in, transitions go out; the service decides what to do with cues
//! and completed roles.

mod command;
mod error;

pub use command::TimerCommand;
pub use error::ControlError;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agenda::{
    default_agenda, parse_time_of_day, AgendaItem, Direction, ItemEdit, MeetingInfo,
    MeetingState,
};
use crate::report::MeetingReport;
use crate::store::{MeetingSnapshot, SnapshotStore, SnapshotSummary};
use crate::timing::{Clock, CueEvent, RoleCategory, TimerPhase, TimingMachine, Transition};

/// How a fresh meeting is set up.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingDefaults {
    pub club_name: String,
    pub scheduled_start: Option<NaiveTime>,
    pub load_preset: bool,
    pub autosave_on_finalize: bool,
}

impl Default for MeetingDefaults {
    fn default() -> Self {
        Self {
            club_name: crate::agenda::DEFAULT_CLUB_NAME.to_string(),
            scheduled_start: NaiveTime::from_hms_opt(19, 30, 0),
            load_preset: true,
            autosave_on_finalize: true,
        }
    }
}

/// Request body for a new agenda row.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewItem {
    pub role_name: String,
    #[serde(default)]
    pub speaker_name: String,
    pub category: RoleCategory,
    pub target_minutes: f64,
    /// Insert after this item; at the top when absent.
    #[serde(default)]
    pub after: Option<Uuid>,
}

/// Meeting metadata changes. Absent fields are left alone; an empty time
/// string clears that time.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InfoUpdate {
    pub club_name: Option<String>,
    pub meeting_number: Option<String>,
    pub theme: Option<String>,
    pub date: Option<NaiveDate>,
    pub scheduled_start: Option<String>,
    pub actual_start: Option<String>,
}

/// Cues fired for one item during a tick pass.
#[derive(Debug, Clone, Serialize)]
pub struct TickEvent {
    pub item_id: Uuid,
    pub role_name: String,
    pub elapsed_seconds: f64,
    pub cues: Vec<CueEvent>,
}

pub struct MeetingController {
    state: MeetingState,
    store: Box<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    defaults: MeetingDefaults,
}

impl MeetingController {
    pub fn new(
        state: MeetingState,
        store: Box<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
        defaults: MeetingDefaults,
    ) -> Self {
        Self {
            state,
            store,
            clock,
            defaults,
        }
    }

    /// Resume the most recent snapshot, or set up a fresh meeting.
    ///
    /// Timers that were running when the snapshot was taken come back paused,
    /// since the time in between was never observed.
    pub fn restore_or_new(
        store: Box<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
        defaults: MeetingDefaults,
    ) -> Result<Self, ControlError> {
        let state = match store.latest()? {
            Some(snapshot) => {
                info!(
                    "Restored meeting snapshot {} saved at {}",
                    snapshot.id, snapshot.saved_at
                );
                let mut state = snapshot.state;
                for item in state.items.iter_mut().filter(|i| i.is_running()) {
                    item.phase = TimerPhase::Paused;
                    item.last_tick = None;
                }
                state
            }
            None => {
                info!("No saved meeting found, starting a new one");
                fresh_meeting(&defaults, clock.now())
            }
        };
        Ok(Self::new(state, store, clock, defaults))
    }

    pub fn state(&self) -> &MeetingState {
        &self.state
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn report(&self) -> MeetingReport {
        MeetingReport::compile(&self.state, self.local_now().date_naive())
    }

    /// The live non-session item, if any.
    pub fn focused(&self) -> Option<&AgendaItem> {
        self.state.live_items().find(|i| !i.is_session())
    }

    pub fn apply(&mut self, id: Uuid, command: TimerCommand) -> Result<Transition, ControlError> {
        let now = self.clock.now();
        let needs_focus = matches!(
            command,
            TimerCommand::Start | TimerCommand::Resume | TimerCommand::Reopen
        );
        if needs_focus {
            self.check_focus(id)?;
        }

        let item = self.state.item_mut(id)?;
        let mut machine = TimingMachine::new(item);

        let transition = match command {
            TimerCommand::Start => machine.start(now)?,
            TimerCommand::Pause => {
                if machine.phase() == TimerPhase::Running {
                    let ticked = machine.tick_at(now)?;
                    merge(ticked, machine.pause()?)
                } else {
                    machine.pause()?
                }
            }
            TimerCommand::Resume => machine.resume(now)?,
            TimerCommand::Adjust(seconds) => machine.manual_adjust(seconds, now)?,
            TimerCommand::RequestStop => {
                if machine.phase() == TimerPhase::Running {
                    let ticked = machine.tick_at(now)?;
                    merge(ticked, machine.request_stop()?)
                } else {
                    machine.request_stop()?
                }
            }
            TimerCommand::ConfirmStop => machine.confirm_stop()?,
            TimerCommand::CancelStop => machine.cancel_stop(now)?,
            TimerCommand::Reset => machine.reset(now)?,
            TimerCommand::Reopen => machine.reopen()?,
        };

        info!(
            "{} '{}' -> {} ({:.0}s, {})",
            command,
            transition.item.role_name,
            transition.item.phase.as_str(),
            transition.item.elapsed_seconds,
            transition.item.status
        );

        if command == TimerCommand::Start {
            let started = self.local_now().time();
            if self.state.record_actual_start(started) {
                info!("Recorded actual meeting start at {}", started.format("%H:%M"));
            }
        }

        if transition.completed.is_some() && self.defaults.autosave_on_finalize {
            self.autosave();
        }

        Ok(transition)
    }

    /// One update pass over every running item, each against its own last tick.
    pub fn tick_all(&mut self) -> Vec<TickEvent> {
        let now = self.clock.now();
        let mut events = Vec::new();

        for item in self.state.items.iter_mut().filter(|i| i.is_running()) {
            let ticked = TimingMachine::new(item).tick_at(now);
            match ticked {
                Ok(transition) if !transition.cues.is_empty() => {
                    debug!(
                        "'{}' reached {:?} at {:.0}s",
                        transition.item.role_name, transition.cues, transition.item.elapsed_seconds
                    );
                    events.push(TickEvent {
                        item_id: transition.item.id,
                        role_name: transition.item.role_name,
                        elapsed_seconds: transition.item.elapsed_seconds,
                        cues: transition.cues,
                    });
                }
                Ok(_) => {}
                Err(e) => warn!("Tick failed for '{}': {}", item.role_name, e),
            }
        }

        events
    }

    pub fn add_item(&mut self, new: NewItem) -> Result<&AgendaItem, ControlError> {
        let item = AgendaItem::new(new.role_name, new.category, new.target_minutes)?
            .with_speaker(new.speaker_name);
        let index = self.state.add_item(item, new.after)?;
        info!("Added '{}' at position {}", self.state.items[index].role_name, index + 1);
        Ok(&self.state.items[index])
    }

    pub fn remove_item(&mut self, id: Uuid) -> Result<AgendaItem, ControlError> {
        let removed = self.state.remove_item(id)?;
        info!("Removed '{}'", removed.role_name);
        Ok(removed)
    }

    pub fn move_item(&mut self, id: Uuid, direction: Direction) -> Result<bool, ControlError> {
        Ok(self.state.move_item(id, direction)?)
    }

    pub fn edit_item(&mut self, id: Uuid, edits: Vec<ItemEdit>) -> Result<&AgendaItem, ControlError> {
        Ok(self.state.edit_item(id, edits)?)
    }

    pub fn toggle_speech(&mut self, id: Uuid) -> Result<&AgendaItem, ControlError> {
        Ok(self.state.toggle_speech(id)?)
    }

    /// Replace the agenda with the standard preset.
    pub fn load_preset(&mut self) -> Result<(), ControlError> {
        self.state.replace_items(default_agenda())?;
        info!("Loaded the default agenda ({} roles)", self.state.items.len());
        Ok(())
    }

    pub fn update_info(&mut self, update: InfoUpdate) -> Result<&MeetingInfo, ControlError> {
        let scheduled_start = update.scheduled_start.as_deref().map(optional_time).transpose()?;
        let actual_start = update.actual_start.as_deref().map(optional_time).transpose()?;

        let info = &mut self.state.info;
        if let Some(club_name) = update.club_name {
            info.club_name = club_name;
        }
        if let Some(meeting_number) = update.meeting_number {
            info.meeting_number = meeting_number;
        }
        if let Some(theme) = update.theme {
            info.theme = theme;
        }
        if let Some(date) = update.date {
            info.date = date;
        }
        if let Some(start) = scheduled_start {
            info.scheduled_start = start;
        }
        if let Some(start) = actual_start {
            info.actual_start = start;
        }
        Ok(&self.state.info)
    }

    /// Set the actual start to the current local time, overwriting any value.
    pub fn mark_actual_start(&mut self) -> NaiveTime {
        let now = self.local_now().time();
        self.state.info.actual_start = Some(now);
        info!("Actual start marked at {}", now.format("%H:%M"));
        now
    }

    /// Archive the current meeting (if anything was timed) and start over.
    pub fn new_meeting(&mut self) -> Result<&MeetingState, ControlError> {
        if self.state.items.iter().any(|i| !i.status.is_pending()) {
            self.save_snapshot()?;
        }
        self.state = fresh_meeting(&self.defaults, self.clock.now());
        info!("Started a new meeting");
        Ok(&self.state)
    }

    pub fn save_snapshot(&mut self) -> Result<i64, ControlError> {
        let id = self.store.save(&self.state, self.clock.now())?;
        info!("Saved meeting snapshot {}", id);
        Ok(id)
    }

    pub fn history(&self, limit: usize) -> Result<Vec<SnapshotSummary>, ControlError> {
        Ok(self.store.list(limit)?)
    }

    /// Load a saved meeting in place of the current one. Refused while a
    /// timer is live.
    pub fn restore_snapshot(&mut self, id: i64) -> Result<&MeetingState, ControlError> {
        if let Some(live) = self.state.live_items().next() {
            return Err(crate::agenda::AgendaError::ItemLive(live.role_name.clone()).into());
        }
        let MeetingSnapshot { state, .. } =
            self.store.get(id)?.ok_or(ControlError::UnknownSnapshot(id))?;
        self.state = state;
        for item in self.state.items.iter_mut().filter(|i| i.phase.is_live()) {
            item.phase = TimerPhase::Paused;
            item.last_tick = None;
        }
        info!("Restored meeting snapshot {}", id);
        Ok(&self.state)
    }

    fn check_focus(&self, id: Uuid) -> Result<(), ControlError> {
        if self.state.item(id)?.is_session() {
            return Ok(());
        }
        match self.focused() {
            Some(other) if other.id != id => Err(ControlError::FocusBusy(other.role_name.clone())),
            _ => Ok(()),
        }
    }

    fn autosave(&mut self) {
        if let Err(e) = self.save_snapshot() {
            warn!("Autosave failed: {}", e);
        }
    }

    fn local_now(&self) -> DateTime<Local> {
        let now = self.clock.now().with_timezone(&Local);
        now.with_nanosecond(0).unwrap_or(now)
    }
}

fn fresh_meeting(defaults: &MeetingDefaults, now: DateTime<Utc>) -> MeetingState {
    let date = now.with_timezone(&Local).date_naive();
    let mut state = MeetingState::new(MeetingInfo::new(defaults.club_name.clone(), date));
    state.info.scheduled_start = defaults.scheduled_start;
    if defaults.load_preset {
        state.items = default_agenda();
    }
    state
}

fn optional_time(text: &str) -> Result<Option<NaiveTime>, ControlError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_time_of_day(text)?))
}

/// Fold two transitions on the same item into one.
fn merge(first: Transition, second: Transition) -> Transition {
    let mut cues = first.cues;
    cues.extend(second.cues);
    Transition {
        item: second.item,
        cues,
        completed: second.completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySnapshotStore;
    use crate::agenda::AgendaError;
    use crate::timing::{ManualClock, QualificationStatus, TimingError};
    use chrono::{Duration, TimeZone};

    fn setup() -> (MeetingController, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 7, 11, 30, 0).unwrap(),
        ));
        let controller = MeetingController::restore_or_new(
            Box::new(MemorySnapshotStore::new(5)),
            clock.clone(),
            MeetingDefaults::default(),
        )
        .unwrap();
        (controller, clock)
    }

    fn id_of(controller: &MeetingController, role: &str) -> Uuid {
        controller
            .state()
            .items
            .iter()
            .find(|i| i.role_name == role)
            .unwrap()
            .id
    }

    #[test]
    fn test_fresh_meeting_uses_defaults() {
        let (controller, _) = setup();
        let state = controller.state();
        assert_eq!(state.items.len(), 21);
        assert_eq!(state.info.club_name, crate::agenda::DEFAULT_CLUB_NAME);
        assert_eq!(state.info.scheduled_start, NaiveTime::from_hms_opt(19, 30, 0));
        assert!(state.info.actual_start.is_none());
    }

    #[test]
    fn test_full_speech_lifecycle() {
        let (mut controller, clock) = setup();
        let id = id_of(&controller, "Speaker 1");

        controller.apply(id, TimerCommand::Start).unwrap();
        assert!(controller.state().info.actual_start.is_some());

        let mut fired = Vec::new();
        for _ in 0..430 {
            clock.advance(Duration::seconds(1));
            for event in controller.tick_all() {
                fired.extend(event.cues);
            }
        }
        assert_eq!(
            fired,
            vec![
                CueEvent::GreenEntered,
                CueEvent::YellowEntered,
                CueEvent::RedEntered
            ]
        );

        controller.apply(id, TimerCommand::RequestStop).unwrap();
        clock.advance(Duration::seconds(60));
        assert!(controller.tick_all().is_empty());

        let done = controller.apply(id, TimerCommand::ConfirmStop).unwrap();
        let outcome = done.completed.unwrap();
        assert_eq!(outcome.elapsed_seconds, 430.0);
        assert_eq!(outcome.status, QualificationStatus::Qualified);
        assert_eq!(outcome.cue_log.len(), 3);

        // autosaved
        assert_eq!(controller.history(10).unwrap().len(), 1);
    }

    #[test]
    fn test_pause_counts_time_up_to_the_pause() {
        let (mut controller, clock) = setup();
        let id = id_of(&controller, "Timer Introduction");
        controller.apply(id, TimerCommand::Start).unwrap();
        clock.advance(Duration::milliseconds(2500));
        let t = controller.apply(id, TimerCommand::Pause).unwrap();
        assert_eq!(t.item.elapsed_seconds, 2.5);
        clock.advance(Duration::seconds(30));
        controller.tick_all();
        assert_eq!(controller.state().item(id).unwrap().elapsed_seconds, 2.5);
    }

    #[test]
    fn test_only_one_focused_timer() {
        let (mut controller, _) = setup();
        let first = id_of(&controller, "Speaker 1");
        let second = id_of(&controller, "Speaker 2");
        controller.apply(first, TimerCommand::Start).unwrap();
        assert!(matches!(
            controller.apply(second, TimerCommand::Start),
            Err(ControlError::FocusBusy(_))
        ));

        controller.apply(first, TimerCommand::RequestStop).unwrap();
        controller.apply(first, TimerCommand::ConfirmStop).unwrap();
        controller.apply(second, TimerCommand::Start).unwrap();

        // Reopening the first would make two live speeches
        assert!(matches!(
            controller.apply(first, TimerCommand::Reopen),
            Err(ControlError::FocusBusy(_))
        ));
    }

    #[test]
    fn test_session_runs_alongside_a_role() {
        let (mut controller, clock) = setup();
        let session = controller
            .add_item(NewItem {
                role_name: "Table Topics Session".into(),
                speaker_name: String::new(),
                category: RoleCategory::Session,
                target_minutes: 20.0,
                after: None,
            })
            .unwrap()
            .id;
        let turn = id_of(&controller, "Table Topics Speaker 1");

        controller.apply(session, TimerCommand::Start).unwrap();
        clock.advance(Duration::seconds(10));
        controller.tick_all();
        controller.apply(turn, TimerCommand::Start).unwrap();
        clock.advance(Duration::seconds(50));
        controller.tick_all();

        controller.apply(turn, TimerCommand::Pause).unwrap();
        clock.advance(Duration::seconds(5));
        controller.tick_all();

        let state = controller.state();
        assert_eq!(state.item(session).unwrap().elapsed_seconds, 65.0);
        assert_eq!(state.item(turn).unwrap().elapsed_seconds, 50.0);
        assert!(state.item(session).unwrap().is_running());
    }

    #[test]
    fn test_live_session_keeps_its_category() {
        let (mut controller, clock) = setup();
        let session = controller
            .add_item(NewItem {
                role_name: "TT Session".into(),
                speaker_name: String::new(),
                category: RoleCategory::Session,
                target_minutes: 20.0,
                after: None,
            })
            .unwrap()
            .id;
        let speaker = id_of(&controller, "Speaker 1");

        controller.apply(session, TimerCommand::Start).unwrap();
        controller.apply(speaker, TimerCommand::Start).unwrap();
        assert!(matches!(
            controller.toggle_speech(session),
            Err(ControlError::Agenda(AgendaError::ItemLive(_)))
        ));
        assert!(matches!(
            controller.edit_item(session, vec![ItemEdit::Category(RoleCategory::Other)]),
            Err(ControlError::Agenda(AgendaError::ItemLive(_)))
        ));

        clock.advance(Duration::seconds(5));
        controller.tick_all();
        let focused: Vec<&str> = controller
            .state()
            .items
            .iter()
            .filter(|i| i.is_running() && !i.is_session())
            .map(|i| i.role_name.as_str())
            .collect();
        assert_eq!(focused, vec!["Speaker 1"]);
    }

    #[test]
    fn test_retarget_of_running_speech_is_refused() {
        let (mut controller, clock) = setup();
        let id = id_of(&controller, "Speaker 1");
        controller.apply(id, TimerCommand::Start).unwrap();
        clock.advance(Duration::seconds(310));
        assert_eq!(controller.tick_all()[0].cues, vec![CueEvent::GreenEntered]);

        assert!(matches!(
            controller.edit_item(id, vec![ItemEdit::TargetMinutes(10.0)]),
            Err(ControlError::Agenda(AgendaError::ItemLive(_)))
        ));
        assert_eq!(controller.state().item(id).unwrap().target_seconds(), 420);

        clock.advance(Duration::seconds(60));
        assert_eq!(controller.tick_all()[0].cues, vec![CueEvent::YellowEntered]);
    }

    #[test]
    fn test_pause_on_idle_names_pause() {
        let (mut controller, _) = setup();
        let id = id_of(&controller, "Speaker 1");
        let err = controller.apply(id, TimerCommand::Pause).unwrap_err();
        assert!(matches!(
            err,
            ControlError::Timing(TimingError::InvalidTransition {
                operation: "pause",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_command_leaves_state_alone() {
        let (mut controller, _) = setup();
        let id = id_of(&controller, "Speaker 1");
        assert!(matches!(
            controller.apply(id, TimerCommand::Pause),
            Err(ControlError::Timing(_))
        ));
        assert!(matches!(
            controller.apply(Uuid::new_v4(), TimerCommand::Start),
            Err(ControlError::Agenda(_))
        ));
        assert_eq!(controller.state().item(id).unwrap().phase, TimerPhase::Idle);
    }

    #[test]
    fn test_manual_adjust_then_start_does_not_replay_cues() {
        let (mut controller, clock) = setup();
        let id = id_of(&controller, "Speaker 1");
        controller.apply(id, TimerCommand::Adjust(330.0)).unwrap();
        controller.apply(id, TimerCommand::Start).unwrap();
        clock.advance(Duration::seconds(40));
        let events = controller.tick_all();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].cues, vec![CueEvent::YellowEntered]);
    }

    #[test]
    fn test_update_info_and_new_meeting() {
        let (mut controller, _) = setup();
        let info = controller
            .update_info(InfoUpdate {
                meeting_number: Some("88".into()),
                theme: Some("Growth".into()),
                scheduled_start: Some("19:00".into()),
                actual_start: Some("".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(info.meeting_number, "88");
        assert_eq!(info.scheduled_start, NaiveTime::from_hms_opt(19, 0, 0));

        assert!(controller
            .update_info(InfoUpdate {
                scheduled_start: Some("7pm".into()),
                ..Default::default()
            })
            .is_err());

        let id = id_of(&controller, "Opening Remark");
        controller.apply(id, TimerCommand::Adjust(150.0)).unwrap();
        controller.new_meeting().unwrap();
        assert_eq!(controller.state().info.meeting_number, "");
        assert!(controller
            .state()
            .items
            .iter()
            .all(|i| i.status.is_pending()));
        // The timed meeting was archived first
        assert_eq!(controller.history(10).unwrap().len(), 1);
    }

    #[test]
    fn test_restore_snapshot() {
        let (mut controller, _) = setup();
        let id = id_of(&controller, "Opening Remark");
        controller.apply(id, TimerCommand::Adjust(200.0)).unwrap();
        let snapshot = controller.save_snapshot().unwrap();

        controller.apply(id, TimerCommand::Reset).unwrap();
        controller.restore_snapshot(snapshot).unwrap();
        assert_eq!(controller.state().item(id).unwrap().elapsed_seconds, 200.0);

        assert!(matches!(
            controller.restore_snapshot(999),
            Err(ControlError::UnknownSnapshot(999))
        ));

        controller.apply(id, TimerCommand::Start).unwrap();
        assert!(matches!(
            controller.restore_snapshot(snapshot),
            Err(ControlError::Agenda(_))
        ));
    }

    #[test]
    fn test_restore_or_new_pauses_running_timers() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 7, 11, 30, 0).unwrap(),
        ));
        let mut store = MemorySnapshotStore::new(5);
        let mut state = fresh_meeting(&MeetingDefaults::default(), clock.now());
        state.items[0].phase = TimerPhase::Running;
        state.items[0].last_tick = Some(clock.now());
        store.save(&state, clock.now()).unwrap();

        let controller =
            MeetingController::restore_or_new(Box::new(store), clock, MeetingDefaults::default())
                .unwrap();
        assert_eq!(controller.state().items[0].phase, TimerPhase::Paused);
        assert!(controller.state().items[0].last_tick.is_none());
    }
}
