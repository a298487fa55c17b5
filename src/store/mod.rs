//! Meeting snapshots with a capped history.

pub mod init;
pub mod memory;
pub mod schemas;
pub mod sqlite;


use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::agenda::MeetingState;

pub use init::{init_db, migrate, open_db};
pub use memory::MemorySnapshotStore;
pub use schemas::{MeetingSnapshot, SnapshotSummary};
pub use sqlite::SqliteSnapshotStore;

/// Persistence port for meeting state. Every save prunes the history down to
/// the store's configured cap, oldest first.
pub trait SnapshotStore: Send {
    fn save(&mut self, state: &MeetingState, saved_at: DateTime<Utc>) -> Result<i64>;
    fn latest(&self) -> Result<Option<MeetingSnapshot>>;
    fn get(&self, id: i64) -> Result<Option<MeetingSnapshot>>;
    /// Newest first.
    fn list(&self, limit: usize) -> Result<Vec<SnapshotSummary>>;
}
