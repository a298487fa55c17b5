//! Meeting aggregate: metadata plus the ordered agenda.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timing::{RoleCategory, TimerPhase};

use super::error::AgendaError;
use super::item::AgendaItem;

pub const DEFAULT_CLUB_NAME: &str = "Toastmasters Club";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingInfo {
    pub club_name: String,
    #[serde(default)]
    pub meeting_number: String,
    #[serde(default)]
    pub theme: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub scheduled_start: Option<NaiveTime>,
    #[serde(default)]
    pub actual_start: Option<NaiveTime>,
}

impl MeetingInfo {
    pub fn new(club_name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            club_name: club_name.into(),
            meeting_number: String::new(),
            theme: String::new(),
            date,
            scheduled_start: None,
            actual_start: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// One field change on an agenda row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "field", content = "value")]
pub enum ItemEdit {
    RoleName(String),
    Speaker(String),
    TargetMinutes(f64),
    Category(RoleCategory),
    Notes(Option<String>),
}

impl ItemEdit {
    fn changes_timing(&self) -> bool {
        matches!(self, Self::TargetMinutes(_) | Self::Category(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingState {
    pub info: MeetingInfo,
    pub items: Vec<AgendaItem>,
}

impl MeetingState {
    pub fn new(info: MeetingInfo) -> Self {
        Self {
            info,
            items: Vec::new(),
        }
    }

    pub fn position(&self, id: Uuid) -> Result<usize, AgendaError> {
        self.items
            .iter()
            .position(|i| i.id == id)
            .ok_or(AgendaError::UnknownItem(id))
    }

    pub fn item(&self, id: Uuid) -> Result<&AgendaItem, AgendaError> {
        self.items
            .iter()
            .find(|i| i.id == id)
            .ok_or(AgendaError::UnknownItem(id))
    }

    pub fn item_mut(&mut self, id: Uuid) -> Result<&mut AgendaItem, AgendaError> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(AgendaError::UnknownItem(id))
    }

    /// Insert after `after`, or at the top when `after` is `None`.
    /// Returns the new item's index.
    pub fn add_item(&mut self, item: AgendaItem, after: Option<Uuid>) -> Result<usize, AgendaError> {
        let index = match after {
            Some(anchor) => self.position(anchor)? + 1,
            None => 0,
        };
        self.items.insert(index, item);
        Ok(index)
    }

    pub fn remove_item(&mut self, id: Uuid) -> Result<AgendaItem, AgendaError> {
        let index = self.position(id)?;
        if self.items[index].phase.is_live() {
            return Err(AgendaError::ItemLive(self.items[index].role_name.clone()));
        }
        Ok(self.items.remove(index))
    }

    /// Swap with the neighbour. Returns false when already at that end.
    pub fn move_item(&mut self, id: Uuid, direction: Direction) -> Result<bool, AgendaError> {
        let index = self.position(id)?;
        let target = match direction {
            Direction::Up if index == 0 => return Ok(false),
            Direction::Up => index - 1,
            Direction::Down if index + 1 >= self.items.len() => return Ok(false),
            Direction::Down => index + 1,
        };
        self.items.swap(index, target);
        Ok(true)
    }

    /// Apply field edits atomically: either all succeed or nothing changes.
    pub fn edit_item(&mut self, id: Uuid, edits: Vec<ItemEdit>) -> Result<&AgendaItem, AgendaError> {
        let current = self.item(id)?;
        if edits.iter().any(ItemEdit::changes_timing) {
            if current.phase.is_live() {
                return Err(AgendaError::ItemLive(current.role_name.clone()));
            }
            if current.phase == TimerPhase::Finalized {
                return Err(AgendaError::ItemFinalized(current.role_name.clone()));
            }
        }

        let mut updated = current.clone();
        for edit in edits {
            match edit {
                ItemEdit::RoleName(name) => updated.role_name = name,
                ItemEdit::Speaker(name) => updated.speaker_name = name,
                ItemEdit::TargetMinutes(minutes) => updated.set_target_minutes(minutes)?,
                ItemEdit::Category(category) => updated.set_category(category),
                ItemEdit::Notes(notes) => updated.notes = notes.filter(|n| !n.trim().is_empty()),
            }
        }

        let slot = self.item_mut(id)?;
        *slot = updated;
        Ok(slot)
    }

    /// Flip between a prepared speech and a generic role.
    pub fn toggle_speech(&mut self, id: Uuid) -> Result<&AgendaItem, AgendaError> {
        let next = match self.item(id)?.category {
            RoleCategory::Speech => RoleCategory::Other,
            _ => RoleCategory::Speech,
        };
        self.edit_item(id, vec![ItemEdit::Category(next)])
    }

    pub fn replace_items(&mut self, items: Vec<AgendaItem>) -> Result<(), AgendaError> {
        if let Some(live) = self.items.iter().find(|i| i.phase.is_live()) {
            return Err(AgendaError::ItemLive(live.role_name.clone()));
        }
        self.items = items;
        Ok(())
    }

    /// Record the real start time once; later calls keep the first value.
    pub fn record_actual_start(&mut self, time: NaiveTime) -> bool {
        if self.info.actual_start.is_some() {
            return false;
        }
        self.info.actual_start = Some(time);
        true
    }

    pub fn live_items(&self) -> impl Iterator<Item = &AgendaItem> {
        self.items.iter().filter(|i| i.phase.is_live())
    }
}
