//! Agenda model: timed roles, meeting metadata and the typed edits allowed on them.

mod error;
pub mod item;
pub mod meeting;
pub mod preset;
pub mod time;

pub use error::AgendaError;
pub use item::{Adjustment, AdjustmentKind, AgendaItem, Countdown};
pub use meeting::{Direction, ItemEdit, MeetingInfo, MeetingState, DEFAULT_CLUB_NAME};
pub use preset::{default_agenda, DEFAULT_AGENDA};
pub use time::{
    format_clock, format_duration, format_time_of_day, parse_manual_time, parse_time_of_day,
};
