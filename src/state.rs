// src/state.rs

//! Shared timetable state.
//!
//! One store holds the latest known timetable per mosque. Pollers are the
//! only writers; the interactive/query side reads through the accessors.
//! Slot updates are monotonic per field, so a reader racing a merge sees at
//! worst a partially applied set, never a blanked one.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::{DefaultTimes, ExtractedTimes, MosqueRegistry, Timetable};
use crate::pipeline::diff::{TimetableDiff, diff_timetable};

/// Handle to the shared per-mosque timetables.
#[derive(Debug, Clone)]
pub struct TimetableStore {
    inner: Arc<RwLock<HashMap<String, Timetable>>>,
}

impl TimetableStore {
    /// Initialize one timetable per registered mosque from the defaults.
    pub fn new(registry: &MosqueRegistry, defaults: &DefaultTimes) -> Self {
        let tables = registry
            .mosques()
            .iter()
            .map(|mosque| {
                let table = Timetable::new(|slot| defaults.for_slot(slot).to_string());
                (mosque.id().to_string(), table)
            })
            .collect();

        Self {
            inner: Arc::new(RwLock::new(tables)),
        }
    }

    /// Diff an extraction against the stored timetable for a mosque.
    pub async fn diff_against(&self, mosque_id: &str, extracted: &ExtractedTimes) -> TimetableDiff {
        let tables = self.inner.read().await;
        match tables.get(mosque_id) {
            Some(table) => diff_timetable(table, extracted),
            None => TimetableDiff::default(),
        }
    }

    /// Merge an extraction into a mosque's stored timetable.
    pub async fn apply(&self, mosque_id: &str, extracted: &ExtractedTimes) {
        let mut tables = self.inner.write().await;
        if let Some(table) = tables.get_mut(mosque_id) {
            table.apply(extracted);
        }
    }

    /// Read a copy of one mosque's timetable.
    pub async fn timetable(&self, mosque_id: &str) -> Option<Timetable> {
        self.inner.read().await.get(mosque_id).cloned()
    }

    /// Read a copy of all timetables in stable order.
    pub async fn all(&self) -> Vec<(String, Timetable)> {
        let tables = self.inner.read().await;
        let mut out: Vec<_> = tables
            .iter()
            .map(|(id, table)| (id.clone(), table.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
