// src/services/script.rs

//! Writing-system detection.
//!
//! Channel posts arrive in Latin Uzbek, Cyrillic Uzbek, or Arabic, and the
//! matcher weighs name variants by whichever script dominates the text.

use unicode_segmentation::UnicodeSegmentation;

use crate::models::Script;

/// Fraction of classified characters a script must exceed to win.
const SCRIPT_RATIO: f64 = 0.3;

/// Classify the dominant writing system of a text fragment.
///
/// Counts grapheme clusters whose first scalar falls in the Arabic block,
/// the Cyrillic block, or the ASCII letters; everything else (digits,
/// punctuation, whitespace) is ignored. Arabic wins above the ratio, then
/// Cyrillic; Latin is the default, including for empty input.
pub fn detect_script(text: &str) -> Script {
    let mut arabic = 0usize;
    let mut cyrillic = 0usize;
    let mut latin = 0usize;

    for grapheme in text.graphemes(true) {
        let Some(c) = grapheme.chars().next() else {
            continue;
        };
        if ('\u{0600}'..='\u{06FF}').contains(&c) {
            arabic += 1;
        } else if ('\u{0400}'..='\u{04FF}').contains(&c) {
            cyrillic += 1;
        } else if c.is_ascii_alphabetic() {
            latin += 1;
        }
    }

    let total = arabic + cyrillic + latin;
    if total == 0 {
        return Script::Latin;
    }

    let total = total as f64;
    if arabic as f64 / total > SCRIPT_RATIO {
        Script::Arabic
    } else if cyrillic as f64 / total > SCRIPT_RATIO {
        Script::Cyrillic
    } else {
        Script::Latin
    }
}
