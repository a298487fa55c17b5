//! Standard club meeting agenda.

use crate::timing::RoleCategory;

use super::item::AgendaItem;

/// (role, category, target minutes)
pub const DEFAULT_AGENDA: &[(&str, RoleCategory, f64)] = &[
    ("Opening Remark", RoleCategory::Other, 3.0),
    ("Timer Introduction", RoleCategory::Other, 3.0),
    ("Grammarian Introduction", RoleCategory::Other, 3.0),
    ("General Evaluator Introduction", RoleCategory::Other, 3.0),
    ("Speaker 1", RoleCategory::Speech, 7.0),
    ("Speaker 2", RoleCategory::Speech, 7.0),
    ("Speaker 3", RoleCategory::Speech, 7.0),
    ("Evaluator 1", RoleCategory::Other, 3.0),
    ("Evaluator 2", RoleCategory::Other, 3.0),
    ("Evaluator 3", RoleCategory::Other, 3.0),
    ("Table Topics Speaker 1", RoleCategory::TableTopic, 2.0),
    ("Table Topics Speaker 2", RoleCategory::TableTopic, 2.0),
    ("Table Topics Speaker 3", RoleCategory::TableTopic, 2.0),
    ("Table Topics Speaker 4", RoleCategory::TableTopic, 2.0),
    ("Table Topics Speaker 5", RoleCategory::TableTopic, 2.0),
    ("Table Topics Evaluation", RoleCategory::Other, 6.0),
    ("Timer Report", RoleCategory::Other, 3.0),
    ("Grammarian Report", RoleCategory::Other, 3.0),
    ("General Evaluator Report", RoleCategory::Other, 10.0),
    ("Moment of Truth", RoleCategory::Other, 5.0),
    ("Closing Remark", RoleCategory::Other, 3.0),
];

/// Fresh pending items for the standard agenda.
pub fn default_agenda() -> Vec<AgendaItem> {
    DEFAULT_AGENDA
        .iter()
        .filter_map(|&(role, category, minutes)| AgendaItem::new(role, category, minutes).ok())
        .collect()
}
