//! Config-backed subscription store.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use crate::delivery::SubscriptionStore;
use crate::error::Result;
use crate::models::SubscriptionEntry;

/// Subscription store built once from `[[subscriptions]]` config entries.
///
/// Recipient order is deterministic so fanout behaves the same across runs.
#[derive(Debug, Clone, Default)]
pub struct StaticSubscriptions {
    by_recipient: BTreeMap<String, BTreeSet<String>>,
}

impl StaticSubscriptions {
    pub fn from_entries(entries: &[SubscriptionEntry]) -> Self {
        let mut by_recipient: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for entry in entries {
            by_recipient
                .entry(entry.recipient.clone())
                .or_default()
                .extend(entry.mosques.iter().cloned());
        }
        Self { by_recipient }
    }

    pub fn recipient_count(&self) -> usize {
        self.by_recipient.len()
    }
}

#[async_trait]
impl SubscriptionStore for StaticSubscriptions {
    async fn watchers(&self, mosque_id: &str) -> Result<Vec<String>> {
        Ok(self
            .by_recipient
            .iter()
            .filter(|(_, watched)| watched.contains(mosque_id))
            .map(|(recipient, _)| recipient.clone())
            .collect())
    }
}
