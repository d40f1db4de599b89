//! Message fingerprinting for reprocessing suppression.
//!
//! A feed page keeps showing the same recent messages on every poll, so each
//! message id is remembered together with a content hash and skipped while
//! the hash is unchanged. The cache is bounded: oldest entries are evicted
//! once the configured capacity is reached, so long uptimes cannot grow it
//! without limit.

use std::collections::{HashMap, VecDeque};

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a message's text content.
pub fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Bounded insertion-ordered cache of message fingerprints.
#[derive(Debug)]
pub struct FingerprintCache {
    capacity: usize,
    entries: HashMap<String, String>,
    order: VecDeque<String>,
}

impl FingerprintCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Whether the stored hash for this message id equals the given one.
    pub fn is_unchanged(&self, id: &str, hash: &str) -> bool {
        self.entries.get(id).is_some_and(|stored| stored == hash)
    }

    /// Record the hash for a message id, evicting the oldest entries when
    /// the capacity is exceeded. Re-seen ids are refreshed to the back of
    /// the eviction order.
    pub fn remember(&mut self, id: &str, hash: String) {
        if self.entries.insert(id.to_string(), hash).is_some() {
            self.order.retain(|known| known != id);
        }
        self.order.push_back(id.to_string());

        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_and_distinct() {
        assert_eq!(fingerprint("Bomdod 05:00"), fingerprint("Bomdod 05:00"));
        assert_ne!(fingerprint("Bomdod 05:00"), fingerprint("Bomdod 05:01"));
        assert_eq!(fingerprint("").len(), 64);
    }

    #[test]
    fn test_first_sight_is_not_unchanged() {
        let cache = FingerprintCache::new(8);
        assert!(!cache.is_unchanged("c/1", &fingerprint("salom")));
    }

    #[test]
    fn test_same_content_is_unchanged_after_remember() {
        let mut cache = FingerprintCache::new(8);
        let hash = fingerprint("salom");
        cache.remember("c/1", hash.clone());

        assert!(cache.is_unchanged("c/1", &hash));
    }

    #[test]
    fn test_edited_content_is_processed_again() {
        let mut cache = FingerprintCache::new(8);
        cache.remember("c/1", fingerprint("salom"));

        let edited = fingerprint("salom (tahrirlangan)");
        assert!(!cache.is_unchanged("c/1", &edited));

        cache.remember("c/1", edited.clone());
        assert!(cache.is_unchanged("c/1", &edited));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut cache = FingerprintCache::new(3);
        for i in 0..5 {
            cache.remember(&format!("c/{i}"), fingerprint(&i.to_string()));
        }

        assert_eq!(cache.len(), 3);
        assert!(!cache.is_unchanged("c/0", &fingerprint("0")));
        assert!(!cache.is_unchanged("c/1", &fingerprint("1")));
        assert!(cache.is_unchanged("c/4", &fingerprint("4")));
    }

    #[test]
    fn test_refresh_moves_entry_to_back() {
        let mut cache = FingerprintCache::new(2);
        cache.remember("c/1", fingerprint("a"));
        cache.remember("c/2", fingerprint("b"));
        cache.remember("c/1", fingerprint("a2"));
        cache.remember("c/3", fingerprint("c"));

        // c/2 was the oldest untouched entry and got evicted.
        assert!(!cache.is_unchanged("c/2", &fingerprint("b")));
        assert!(cache.is_unchanged("c/1", &fingerprint("a2")));
        assert!(cache.is_unchanged("c/3", &fingerprint("c")));
    }
}
