//! API route modules.

pub mod agenda;
pub mod meeting;
pub mod report;
pub mod snapshots;
pub mod thresholds;
pub mod timer;
