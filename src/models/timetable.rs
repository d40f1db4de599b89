//! Prayer timetable data structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One of the five canonical daily prayer slots.
///
/// Slot names are internal and language-independent; the display label is the
/// Uzbek form the monitored channels use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PrayerSlot {
    Dawn,
    Midday,
    Afternoon,
    Sunset,
    Night,
}

impl PrayerSlot {
    /// All slots in canonical day order.
    pub const ALL: [PrayerSlot; 5] = [
        PrayerSlot::Dawn,
        PrayerSlot::Midday,
        PrayerSlot::Afternoon,
        PrayerSlot::Sunset,
        PrayerSlot::Night,
    ];

    /// Internal key used in config files and dumps.
    pub fn key(&self) -> &'static str {
        match self {
            PrayerSlot::Dawn => "dawn",
            PrayerSlot::Midday => "midday",
            PrayerSlot::Afternoon => "afternoon",
            PrayerSlot::Sunset => "sunset",
            PrayerSlot::Night => "night",
        }
    }

    /// Display label used in notification messages.
    pub fn label(&self) -> &'static str {
        match self {
            PrayerSlot::Dawn => "Bomdod",
            PrayerSlot::Midday => "Peshin",
            PrayerSlot::Afternoon => "Asr",
            PrayerSlot::Sunset => "Shom",
            PrayerSlot::Night => "Xufton",
        }
    }
}

/// A partial extraction result: only the slots a message actually yielded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedTimes {
    times: BTreeMap<PrayerSlot, String>,
}

impl ExtractedTimes {
    pub fn get(&self, slot: PrayerSlot) -> Option<&str> {
        self.times.get(&slot).map(String::as_str)
    }

    pub fn contains(&self, slot: PrayerSlot) -> bool {
        self.times.contains_key(&slot)
    }

    /// Insert a value unless the slot is already populated.
    ///
    /// First write wins, which is what gives higher-priority script patterns
    /// precedence during extraction. Empty values are ignored.
    pub fn insert_if_absent(&mut self, slot: PrayerSlot, value: String) {
        if !value.is_empty() {
            self.times.entry(slot).or_insert(value);
        }
    }

    /// Number of populated slots.
    pub fn populated(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PrayerSlot, &str)> {
        self.times.iter().map(|(slot, value)| (*slot, value.as_str()))
    }
}

#[cfg(test)]
impl FromIterator<(PrayerSlot, String)> for ExtractedTimes {
    fn from_iter<I: IntoIterator<Item = (PrayerSlot, String)>>(iter: I) -> Self {
        let mut out = Self::default();
        for (slot, value) in iter {
            out.insert_if_absent(slot, value);
        }
        out
    }
}

/// A full timetable for one mosque: every slot always holds a value.
///
/// Slots are initialized from defaults and only ever replaced by non-empty
/// extracted values, so a partial extraction can never blank a known time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    times: BTreeMap<PrayerSlot, String>,
}

impl Timetable {
    /// Build a timetable with the same initial value resolution for all slots.
    pub fn new(initial: impl Fn(PrayerSlot) -> String) -> Self {
        let times = PrayerSlot::ALL
            .iter()
            .map(|slot| (*slot, initial(*slot)))
            .collect();
        Self { times }
    }

    pub fn get(&self, slot: PrayerSlot) -> &str {
        // Every slot is populated at construction.
        self.times.get(&slot).map(String::as_str).unwrap_or_default()
    }

    /// Merge an extraction into the timetable, slot by slot.
    pub fn apply(&mut self, extracted: &ExtractedTimes) {
        for (slot, value) in extracted.iter() {
            self.times.insert(slot, value.to_string());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PrayerSlot, &str)> {
        self.times.iter().map(|(slot, value)| (*slot, value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_if_absent_keeps_first_value() {
        let mut times = ExtractedTimes::default();
        times.insert_if_absent(PrayerSlot::Dawn, "05:00".to_string());
        times.insert_if_absent(PrayerSlot::Dawn, "05:30".to_string());

        assert_eq!(times.get(PrayerSlot::Dawn), Some("05:00"));
        assert_eq!(times.populated(), 1);
    }

    #[test]
    fn test_insert_if_absent_ignores_empty() {
        let mut times = ExtractedTimes::default();
        times.insert_if_absent(PrayerSlot::Night, String::new());

        assert!(times.is_empty());
    }

    #[test]
    fn test_timetable_always_has_five_slots() {
        let table = Timetable::new(|_| "00:00".to_string());
        assert_eq!(table.iter().count(), 5);
        assert_eq!(table.get(PrayerSlot::Sunset), "00:00");
    }

    #[test]
    fn test_apply_never_blanks_known_slots() {
        let mut table = Timetable::new(|_| "04:45".to_string());

        let mut partial = ExtractedTimes::default();
        partial.insert_if_absent(PrayerSlot::Midday, "12:30".to_string());
        table.apply(&partial);

        assert_eq!(table.get(PrayerSlot::Midday), "12:30");
        assert_eq!(table.get(PrayerSlot::Dawn), "04:45");
        assert_eq!(table.iter().count(), 5);
    }
}
