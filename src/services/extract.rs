// src/services/extract.rs

//! Prayer time extraction from message text.
//!
//! Each script carries five labeled patterns of the shape
//! `<label synonyms> <separator> <hour><sep><minute>`. The whole lowercased
//! text is scanned script by script in a fixed priority order; the first
//! match per slot wins, so a lower-priority script never overwrites a slot
//! an earlier script already filled. Separators `:`, `-`, `–`, `—` and `.`
//! all normalize to `:` and hours are zero-padded.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ExtractedTimes, PrayerSlot, Script};

/// Label synonyms per (script, slot), in extraction priority order.
const LABELS: [(Script, [(PrayerSlot, &str); 5]); 3] = [
    (
        Script::Latin,
        [
            (PrayerSlot::Dawn, "bomdod|bomdot|saharlik"),
            (PrayerSlot::Midday, "peshin"),
            (PrayerSlot::Afternoon, "asr"),
            (PrayerSlot::Sunset, "shom"),
            (PrayerSlot::Night, "xufton|hufton|khufton"),
        ],
    ),
    (
        Script::Cyrillic,
        [
            (PrayerSlot::Dawn, "бомдод|сахарлик"),
            (PrayerSlot::Midday, "пешин"),
            (PrayerSlot::Afternoon, "аср"),
            (PrayerSlot::Sunset, "шом"),
            (PrayerSlot::Night, "хуфтон"),
        ],
    ),
    (
        Script::Arabic,
        [
            (PrayerSlot::Dawn, "الفجر|فجر|الصبح|صبح"),
            (PrayerSlot::Midday, "الظهر|ظهر"),
            (PrayerSlot::Afternoon, "العصر|عصر"),
            (PrayerSlot::Sunset, "المغرب|مغرب"),
            (PrayerSlot::Night, "العشاء|عشاء"),
        ],
    ),
];

type PatternTable = Vec<(Script, Vec<(PrayerSlot, Regex)>)>;

static PATTERNS: LazyLock<PatternTable> = LazyLock::new(|| {
    LABELS
        .iter()
        .map(|(script, slots)| {
            let compiled = slots
                .iter()
                .map(|(slot, labels)| (*slot, time_pattern(labels)))
                .collect();
            (*script, compiled)
        })
        .collect()
});

/// Compile a labeled time pattern: label, optional separator, `H[H]<sep>MM`.
fn time_pattern(labels: &str) -> Regex {
    let pattern =
        format!(r"\b(?:{labels})\b\s*[:\-–—.]?\s*([0-9]{{1,2}})\s*[:\-–—.]\s*([0-9]{{2}})");
    Regex::new(&pattern).expect("static prayer time pattern")
}

/// Extract labeled prayer times from a text fragment.
///
/// Hours above 23 and minutes above 59 are rejected; a rejected match does
/// not stop a lower-priority script from supplying the same slot.
pub fn extract_times(text: &str) -> ExtractedTimes {
    let lowered = text.to_lowercase();
    let mut out = ExtractedTimes::default();

    for (script, patterns) in PATTERNS.iter() {
        for (slot, pattern) in patterns {
            if out.contains(*slot) {
                continue;
            }
            let Some(caps) = pattern.captures(&lowered) else {
                continue;
            };
            let (Ok(hour), Ok(minute)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
                continue;
            };
            if hour > 23 || minute > 59 {
                log::debug!(
                    "Rejected out-of-range time {:02}:{:02} for {} ({})",
                    hour,
                    minute,
                    slot.key(),
                    script.as_str()
                );
                continue;
            }
            out.insert_if_absent(*slot, format!("{hour:02}:{minute:02}"));
        }
    }

    out
}
