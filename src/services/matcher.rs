// src/services/matcher.rs

//! Mosque identification in free-form channel text.
//!
//! A message is attributed to a mosque either by an exact occurrence of one
//! of its name variants or, failing that, by the best weighted edit
//! similarity across all variants of all mosques. Variants written in the
//! same script as the message are trusted more than cross-script ones.

use crate::models::{MatcherConfig, Mosque, MosqueRegistry};
use crate::services::script::detect_script;

/// Edit distance between two char sequences (two-row dynamic programming).
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Normalized edit similarity in `0.0..=1.0`.
///
/// Symmetric; 1.0 for identical strings (including two empty strings),
/// 0.0 when one side is empty and the other is not.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / max_len as f64
}

/// Matches message text against the mosque registry.
#[derive(Debug, Clone)]
pub struct MosqueMatcher {
    registry: MosqueRegistry,
    threshold: f64,
    cross_script_weight: f64,
}

impl MosqueMatcher {
    pub fn new(registry: MosqueRegistry, config: &MatcherConfig) -> Self {
        Self {
            registry,
            threshold: config.threshold,
            cross_script_weight: config.cross_script_weight,
        }
    }

    pub fn registry(&self) -> &MosqueRegistry {
        &self.registry
    }

    /// Find the mosque a text fragment refers to, if any.
    ///
    /// An exact substring hit on any variant returns its mosque immediately.
    /// Otherwise the maximum weighted similarity across the whole registry
    /// decides, and only if it strictly exceeds the threshold; the first
    /// variant reaching the maximum wins ties via stable iteration order.
    pub fn find(&self, text: &str) -> Option<&Mosque> {
        let normalized = text.to_lowercase();
        let text_script = detect_script(&normalized);

        let mut best: Option<(&Mosque, f64)> = None;

        for mosque in self.registry.mosques() {
            for variant in mosque.variants() {
                if normalized.contains(&variant.name) {
                    return Some(mosque);
                }

                let weight = if variant.script == text_script {
                    1.0
                } else {
                    self.cross_script_weight
                };
                let score = similarity(&normalized, &variant.name) * weight;

                if score > best.map_or(0.0, |(_, s)| s) {
                    best = Some((mosque, score));
                }
            }
        }

        best.filter(|(_, score)| *score > self.threshold)
            .map(|(mosque, _)| mosque)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MosqueEntry, VariantEntry};

    fn entry(id: &str, latin: &[&str], cyrillic: &[&str]) -> MosqueEntry {
        MosqueEntry {
            id: id.to_string(),
            display_name: id.to_string(),
            variants: VariantEntry {
                latin: latin.iter().map(|s| s.to_string()).collect(),
                cyrillic: cyrillic.iter().map(|s| s.to_string()).collect(),
                arabic: vec![],
            },
        }
    }

    fn matcher_with(threshold: f64) -> MosqueMatcher {
        let registry = MosqueRegistry::from_entries(&[
            entry(
                "norbutabek",
                &["norbutabek jome masjidi", "norbutabek"],
                &["норбутабек"],
            ),
            entry("gishtlik", &["gishtlik masjidi", "gishtlik"], &["гиштлик"]),
        ])
        .unwrap();

        MosqueMatcher::new(
            registry,
            &MatcherConfig {
                threshold,
                cross_script_weight: 0.8,
                confidence_floor: 3,
            },
        )
    }

    #[test]
    fn test_similarity_identity_and_symmetry() {
        assert_eq!(similarity("masjid", "masjid"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
        let ab = similarity("gishtlik", "gishtlig");
        let ba = similarity("gishtlig", "gishtlik");
        assert_eq!(ab, ba);
        assert!(ab > 0.8 && ab < 1.0);
    }

    #[test]
    fn test_exact_variant_short_circuits() {
        let matcher = matcher_with(0.7);
        // Every registered variant must resolve to its own mosque, even when
        // it sits inside a larger message.
        for mosque in matcher.registry().mosques() {
            for variant in mosque.variants() {
                let found = matcher.find(&variant.name).unwrap();
                assert_eq!(found.id(), mosque.id());
            }
        }

        let found = matcher
            .find("NORBUTABEK JOME MASJIDI\nBomdod: 05:00")
            .unwrap();
        assert_eq!(found.id(), "norbutabek");
    }

    #[test]
    fn test_fuzzy_match_with_typo() {
        let matcher = matcher_with(0.7);
        let found = matcher.find("norbutabeg").unwrap();
        assert_eq!(found.id(), "norbutabek");
    }

    #[test]
    fn test_cyrillic_variant_matches_cyrillic_text() {
        let matcher = matcher_with(0.7);
        let found = matcher.find("Гиштлик масжиди").unwrap();
        assert_eq!(found.id(), "gishtlik");
    }

    #[test]
    fn test_no_match_for_unrelated_text() {
        let matcher = matcher_with(0.7);
        assert!(matcher.find("ertaga yomg'ir yog'adi").is_none());
    }

    #[test]
    fn test_threshold_monotonic() {
        // Raising the threshold can only lose matches, never gain them.
        let texts = ["norbutabeg", "gishtlik x", "zzzz", "норбутабек!"];
        for text in texts {
            let loose = matcher_with(0.5).find(text).map(|m| m.id().to_string());
            let strict = matcher_with(0.9).find(text).map(|m| m.id().to_string());
            if loose.is_none() {
                assert!(strict.is_none(), "strict matched where loose did not: {text}");
            }
        }
    }

    #[test]
    fn test_levenshtein_basics() {
        let dist = |a: &str, b: &str| {
            levenshtein(
                &a.chars().collect::<Vec<_>>(),
                &b.chars().collect::<Vec<_>>(),
            )
        };
        assert_eq!(dist("", "abc"), 3);
        assert_eq!(dist("kitten", "sitting"), 3);
        assert_eq!(dist("masjid", "masjid"), 0);
    }
}
