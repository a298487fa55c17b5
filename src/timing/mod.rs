//! Timing core: thresholds, qualification status and the per-role state machine.
//!
//! Nothing in here does I/O. Ticks arrive with an explicit delta or timestamp,
//! and results go back to the caller as values.

pub mod clock;
pub mod error;
pub mod machine;
pub mod status;
pub mod thresholds;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TimingError;
pub use machine::{StopOutcome, TimerPhase, TimingMachine, Transition};
pub use status::{
    compute_status, signal_zone, CueEvent, CueRecord, CueSet, QualificationStatus, SignalZone,
};
pub use thresholds::{compute_thresholds, target_seconds, RoleCategory, TimerConfig};
