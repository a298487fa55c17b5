//! Audible cues: tone synthesis, the external player and cue sinks.

pub mod player;
pub mod sink;
pub mod tone;

pub use player::CuePlayer;
pub use sink::{dispatch, AudioCueSink, CueNotice, CueSink, LogCueSink};
