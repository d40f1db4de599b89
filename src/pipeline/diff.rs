//! Timetable diff calculation for change notifications.
//!
//! Compares a stored timetable against a fresh extraction and keeps only the
//! slots whose value actually changed, so subscribers are never pinged for a
//! repost of an unchanged schedule.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{ExtractedTimes, PrayerSlot, Timetable};

/// Old and new value of one changed slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: String,
    pub new: String,
}

/// The set of slots that changed between a timetable and an extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableDiff {
    pub changes: BTreeMap<PrayerSlot, FieldChange>,
}

impl TimetableDiff {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Get the total number of changed slots.
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }
}

/// Calculate which slots an extraction would change.
///
/// Slots absent from the extraction are never considered changed. Pure; the
/// caller applies the update to the stored timetable after diffing.
pub fn diff_timetable(old: &Timetable, new: &ExtractedTimes) -> TimetableDiff {
    let mut changes = BTreeMap::new();

    for (slot, value) in new.iter() {
        let previous = old.get(slot);
        if previous != value {
            changes.insert(
                slot,
                FieldChange {
                    old: previous.to_string(),
                    new: value.to_string(),
                },
            );
        }
    }

    TimetableDiff { changes }
}
