use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::agenda::MeetingState;

/// A saved copy of the whole meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingSnapshot {
    pub id: i64,
    pub saved_at: DateTime<Utc>,
    pub state: MeetingState,
}

impl MeetingSnapshot {
    pub fn from_row(id: i64, saved_at: String, payload: String) -> Result<Self> {
        let saved_at = DateTime::parse_from_rfc3339(&saved_at)
            .with_context(|| format!("Invalid saved_at on snapshot {}", id))?
            .with_timezone(&Utc);
        let state = serde_json::from_str(&payload)
            .with_context(|| format!("Corrupt payload on snapshot {}", id))?;
        Ok(Self {
            id,
            saved_at,
            state,
        })
    }

    pub fn summary(&self) -> SnapshotSummary {
        let info = &self.state.info;
        SnapshotSummary {
            id: self.id,
            saved_at: self.saved_at,
            club_name: info.club_name.clone(),
            meeting_number: info.meeting_number.clone(),
            date: info.date,
            completed: self
                .state
                .items
                .iter()
                .filter(|i| !i.status.is_pending())
                .count(),
            total: self.state.items.len(),
        }
    }
}

/// History listing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub id: i64,
    pub saved_at: DateTime<Utc>,
    pub club_name: String,
    pub meeting_number: String,
    pub date: NaiveDate,
    pub completed: usize,
    pub total: usize,
}

pub fn to_row(state: &MeetingState, saved_at: DateTime<Utc>) -> Result<(String, String)> {
    Ok((
        saved_at.to_rfc3339(),
        serde_json::to_string(state).context("Failed to serialize meeting state")?,
    ))
}
