use anyhow::Result;
use chrono::{DateTime, Utc};

use super::schemas::{MeetingSnapshot, SnapshotSummary};
use super::SnapshotStore;
use crate::agenda::MeetingState;

/// Keeps snapshots in a vector, oldest first.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: Vec<MeetingSnapshot>,
    next_id: i64,
    max_snapshots: usize,
}

impl MemorySnapshotStore {
    pub fn new(max_snapshots: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            next_id: 1,
            max_snapshots: max_snapshots.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&mut self, state: &MeetingState, saved_at: DateTime<Utc>) -> Result<i64> {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.snapshots.push(MeetingSnapshot {
            id,
            saved_at,
            state: state.clone(),
        });
        let excess = self.snapshots.len().saturating_sub(self.max_snapshots.max(1));
        self.snapshots.drain(..excess);
        Ok(id)
    }

    fn latest(&self) -> Result<Option<MeetingSnapshot>> {
        Ok(self.snapshots.last().cloned())
    }

    fn get(&self, id: i64) -> Result<Option<MeetingSnapshot>> {
        Ok(self.snapshots.iter().find(|s| s.id == id).cloned())
    }

    fn list(&self, limit: usize) -> Result<Vec<SnapshotSummary>> {
        Ok(self
            .snapshots
            .iter()
            .rev()
            .take(limit)
            .map(MeetingSnapshot::summary)
            .collect())
    }
}
