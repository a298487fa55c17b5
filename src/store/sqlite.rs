use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use super::schemas::{to_row, MeetingSnapshot, SnapshotSummary};
use super::SnapshotStore;
use crate::agenda::MeetingState;

pub struct SqliteSnapshotStore {
    conn: Connection,
    max_snapshots: usize,
}

impl SqliteSnapshotStore {
    /// Takes a connection that has already been migrated.
    pub fn new(conn: Connection, max_snapshots: usize) -> Self {
        Self {
            conn,
            max_snapshots: max_snapshots.max(1),
        }
    }

    pub fn open_default(max_snapshots: usize) -> Result<Self> {
        Ok(Self::new(super::init::init_db()?, max_snapshots))
    }
}

pub fn insert_snapshot(
    conn: &Connection,
    state: &MeetingState,
    saved_at: DateTime<Utc>,
) -> Result<i64> {
    let (saved_at, payload) = to_row(state, saved_at)?;
    conn.execute(
        "INSERT INTO snapshots (saved_at, payload) VALUES (?1, ?2)",
        rusqlite::params![saved_at, payload],
    )
    .context("Failed to insert snapshot")?;

    Ok(conn.last_insert_rowid())
}

pub fn count_snapshots(conn: &Connection) -> Result<i64> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))
        .context("Failed to count snapshots")?;

    Ok(count)
}

pub fn prune_old_snapshots(conn: &Connection, max_count: i64) -> Result<usize> {
    let count = count_snapshots(conn)?;

    if count <= max_count {
        return Ok(0);
    }

    let to_delete = count - max_count;

    let deleted = conn
        .execute(
            "DELETE FROM snapshots WHERE id IN (
                SELECT id FROM snapshots ORDER BY id ASC LIMIT ?1
            )",
            [to_delete],
        )
        .context("Failed to prune old snapshots")?;

    Ok(deleted)
}

pub fn get_snapshot(conn: &Connection, id: i64) -> Result<Option<MeetingSnapshot>> {
    let row = conn
        .query_row(
            "SELECT id, saved_at, payload FROM snapshots WHERE id = ?1",
            [id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()
        .context("Failed to query snapshot")?;

    row.map(|(id, saved_at, payload)| MeetingSnapshot::from_row(id, saved_at, payload))
        .transpose()
}

pub fn get_recent_snapshots(conn: &Connection, limit: usize) -> Result<Vec<MeetingSnapshot>> {
    let mut stmt = conn
        .prepare("SELECT id, saved_at, payload FROM snapshots ORDER BY id DESC LIMIT ?1")
        .context("Failed to prepare query")?;

    let rows = stmt
        .query_map([limit as i64], |row| {
            let id: i64 = row.get(0)?;
            let saved_at: String = row.get(1)?;
            let payload: String = row.get(2)?;
            Ok((id, saved_at, payload))
        })
        .context("Failed to query snapshots")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to map snapshots")?;

    rows.into_iter()
        .map(|(id, saved_at, payload)| MeetingSnapshot::from_row(id, saved_at, payload))
        .collect()
}

impl SnapshotStore for SqliteSnapshotStore {
    fn save(&mut self, state: &MeetingState, saved_at: DateTime<Utc>) -> Result<i64> {
        let id = insert_snapshot(&self.conn, state, saved_at)?;
        let pruned = prune_old_snapshots(&self.conn, self.max_snapshots as i64)?;
        if pruned > 0 {
            debug!("Pruned {} old snapshot(s)", pruned);
        }
        Ok(id)
    }

    fn latest(&self) -> Result<Option<MeetingSnapshot>> {
        Ok(get_recent_snapshots(&self.conn, 1)?.into_iter().next())
    }

    fn get(&self, id: i64) -> Result<Option<MeetingSnapshot>> {
        get_snapshot(&self.conn, id)
    }

    fn list(&self, limit: usize) -> Result<Vec<SnapshotSummary>> {
        Ok(get_recent_snapshots(&self.conn, limit)?
            .iter()
            .map(MeetingSnapshot::summary)
            .collect())
    }
}
