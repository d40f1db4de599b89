//! Channel polling loop.
//!
//! One poller owns one channel feed. Each cycle fetches the feed, walks the
//! most recent message blocks, and pushes confident timetable extractions
//! through diffing, the shared store, and notification fanout. Fetch
//! failures extend the sleep instead of crashing the loop, and shutdown is
//! cooperative: the signal is honored at the sleep boundary, never mid-fetch.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::error::Result;
use crate::models::{ChannelConfig, Config};
use crate::pipeline::fingerprint::{FingerprintCache, fingerprint};
use crate::pipeline::notify::Fanout;
use crate::services::{FeedClient, FeedMessage, MosqueMatcher, extract_times};
use crate::state::TimetableStore;
use crate::utils::truncate;

/// Counters for one polling cycle.
#[derive(Debug, Clone)]
pub struct PollStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Message blocks inspected
    pub messages: usize,
    /// Blocks skipped via unchanged fingerprints
    pub skipped: usize,
    /// Blocks attributed to a mosque
    pub matched: usize,
    /// Confident extractions applied to the store
    pub updated: usize,
    /// Recipients notified across all diffs
    pub notified: usize,
}

/// Result of one polling cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// Feed fetched and processed
    Polled(PollStats),
    /// Fetch failed; caller should back off
    FetchFailed,
}

/// Polls one channel feed and feeds extractions into the shared state.
pub struct ChannelPoller {
    channel: ChannelConfig,
    feed: FeedClient,
    matcher: MosqueMatcher,
    store: TimetableStore,
    fanout: Fanout,
    fingerprints: FingerprintCache,
    confidence_floor: usize,
    poll_interval: Duration,
    backoff_interval: Duration,
}

impl ChannelPoller {
    pub fn new(
        channel: ChannelConfig,
        config: &Config,
        matcher: MosqueMatcher,
        store: TimetableStore,
        fanout: Fanout,
    ) -> Result<Self> {
        let feed = FeedClient::new(&config.poller, &config.feed_selectors)?;

        Ok(Self {
            channel,
            feed,
            matcher,
            store,
            fanout,
            fingerprints: FingerprintCache::new(config.poller.fingerprint_capacity),
            confidence_floor: config.matcher.confidence_floor,
            poll_interval: Duration::from_secs(config.poller.poll_interval_secs),
            backoff_interval: Duration::from_secs(config.poller.backoff_interval_secs),
        })
    }

    /// Run the polling loop until the shutdown signal fires.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        log::info!(
            "Poller for '{}' started ({})",
            self.channel.name,
            self.channel.url
        );

        loop {
            let delay = match self.cycle().await {
                CycleOutcome::Polled(stats) => {
                    if stats.updated > 0 {
                        log::info!(
                            "[{}] {} messages, {} updates, {} recipients notified",
                            self.channel.name,
                            stats.messages,
                            stats.updated,
                            stats.notified
                        );
                    } else {
                        log::debug!(
                            "[{}] {} messages, {} skipped, {} matched, no updates",
                            self.channel.name,
                            stats.messages,
                            stats.skipped,
                            stats.matched
                        );
                    }
                    self.poll_interval
                }
                CycleOutcome::FetchFailed => self.backoff_interval,
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {
                    log::info!("Poller for '{}' shutting down", self.channel.name);
                    break;
                }
            }
        }
    }

    /// One fetch-and-process cycle.
    pub async fn cycle(&mut self) -> CycleOutcome {
        match self.feed.fetch_messages(&self.channel.url).await {
            Ok(messages) => CycleOutcome::Polled(self.process_messages(messages).await),
            Err(e) => {
                log::warn!(
                    "Fetch failed for '{}', backing off: {}",
                    self.channel.name,
                    e
                );
                CycleOutcome::FetchFailed
            }
        }
    }

    /// Process parsed message blocks against the registry and the store.
    pub async fn process_messages(&mut self, messages: Vec<FeedMessage>) -> PollStats {
        let started_at = Utc::now();
        let mut stats = PollStats {
            started_at,
            finished_at: started_at,
            messages: messages.len(),
            skipped: 0,
            matched: 0,
            updated: 0,
            notified: 0,
        };

        for message in messages {
            let hash = fingerprint(&message.text);
            if self.fingerprints.is_unchanged(&message.id, &hash) {
                stats.skipped += 1;
                continue;
            }
            self.fingerprints.remember(&message.id, hash);

            let Some(mosque) = self.matcher.find(&message.text) else {
                log::debug!(
                    "[{}] No mosque matched in {}: {}",
                    self.channel.name,
                    message.id,
                    truncate(&message.text, 60)
                );
                continue;
            };
            stats.matched += 1;

            let extracted = extract_times(&message.text);
            if extracted.populated() < self.confidence_floor {
                log::debug!(
                    "[{}] Extraction for {} below confidence floor ({}/{})",
                    self.channel.name,
                    mosque.id(),
                    extracted.populated(),
                    self.confidence_floor
                );
                continue;
            }

            let diff = self.store.diff_against(mosque.id(), &extracted).await;
            self.store.apply(mosque.id(), &extracted).await;
            stats.updated += 1;

            if diff.has_changes() {
                stats.notified += self.fanout.notify(mosque, &diff).await;
            }
        }

        stats.finished_at = Utc::now();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::delivery::{MessageSink, StaticSubscriptions};
    use crate::models::{MosqueRegistry, PrayerSlot, SubscriptionEntry};

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        async fn deliver(&self, recipient: &str, text: &str) -> crate::error::Result<()> {
            self.sent
                .lock()
                .await
                .push((recipient.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn poller_with_subs(
        watchers: &[&str],
    ) -> (ChannelPoller, Arc<RecordingSink>, TimetableStore) {
        let config = Config::default();
        let registry = MosqueRegistry::from_entries(&config.mosques).unwrap();
        let matcher = MosqueMatcher::new(registry, &config.matcher);
        let store = TimetableStore::new(matcher.registry(), &config.default_times);

        let sink = Arc::new(RecordingSink::default());
        let entries: Vec<_> = watchers
            .iter()
            .map(|recipient| SubscriptionEntry {
                recipient: recipient.to_string(),
                mosques: vec!["norbutabek".to_string()],
            })
            .collect();
        let fanout = Fanout::new(
            sink.clone(),
            Arc::new(StaticSubscriptions::from_entries(&entries)),
            Duration::ZERO,
        );

        let channel = ChannelConfig {
            name: "test".to_string(),
            url: "https://t.me/s/test".to_string(),
        };
        let poller =
            ChannelPoller::new(channel, &config, matcher, store.clone(), fanout).unwrap();
        (poller, sink, store)
    }

    fn timetable_message() -> FeedMessage {
        FeedMessage {
            id: "test/1".to_string(),
            text: "NORBUTABEK JOME MASJIDI\n\
                   Bomdod: 05:00\nPeshin: 12:30\nAsr: 15:45\nShom: 18:15\nHufton: 20:00"
                .to_string(),
            photo: None,
        }
    }

    #[tokio::test]
    async fn test_full_message_updates_and_notifies_all_watchers() {
        let (mut poller, sink, store) = poller_with_subs(&["100", "200"]);

        let stats = poller.process_messages(vec![timetable_message()]).await;

        assert_eq!(stats.messages, 1);
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.notified, 2);

        let table = store.timetable("norbutabek").await.unwrap();
        assert_eq!(table.get(PrayerSlot::Dawn), "05:00");
        assert_eq!(table.get(PrayerSlot::Night), "20:00");

        let sent = sink.sent.lock().await;
        assert_eq!(sent.len(), 2);
        // All five slots changed from the defaults.
        assert_eq!(sent[0].1.matches('→').count(), 5);
    }

    #[tokio::test]
    async fn test_identical_repost_is_processed_once() {
        let (mut poller, sink, _store) = poller_with_subs(&["100"]);

        let first = poller.process_messages(vec![timetable_message()]).await;
        assert_eq!(first.updated, 1);
        assert_eq!(first.notified, 1);

        let second = poller.process_messages(vec![timetable_message()]).await;
        assert_eq!(second.skipped, 1);
        assert_eq!(second.matched, 0);
        assert_eq!(second.notified, 0);

        assert_eq!(sink.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_edited_message_is_reprocessed() {
        let (mut poller, sink, store) = poller_with_subs(&["100"]);

        poller.process_messages(vec![timetable_message()]).await;

        let mut edited = timetable_message();
        edited.text = edited.text.replace("05:00", "05:10");
        let stats = poller.process_messages(vec![edited]).await;

        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.updated, 1);
        assert_eq!(
            store.timetable("norbutabek").await.unwrap().get(PrayerSlot::Dawn),
            "05:10"
        );
        // Second notification only carries the dawn change.
        let sent = sink.sent.lock().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].1.matches('→').count(), 1);
    }

    #[tokio::test]
    async fn test_below_confidence_floor_is_ignored() {
        let (mut poller, sink, store) = poller_with_subs(&["100"]);

        let message = FeedMessage {
            id: "test/2".to_string(),
            text: "gishtlik masjid: Asr 17:15".to_string(),
            photo: None,
        };
        let stats = poller.process_messages(vec![message]).await;

        assert_eq!(stats.matched, 1);
        assert_eq!(stats.updated, 0);
        assert_eq!(stats.notified, 0);
        assert!(sink.sent.lock().await.is_empty());

        // Stored timetable keeps its defaults.
        let table = store.timetable("gishtlik").await.unwrap();
        assert_eq!(table.get(PrayerSlot::Afternoon), "17:45");
    }

    #[tokio::test]
    async fn test_unmatched_message_is_ignored_but_fingerprinted() {
        let (mut poller, _sink, _store) = poller_with_subs(&["100"]);

        let message = FeedMessage {
            id: "test/3".to_string(),
            text: "Bugun ob-havo issiq bo'ladi".to_string(),
            photo: None,
        };
        let first = poller.process_messages(vec![message.clone()]).await;
        assert_eq!(first.matched, 0);

        let second = poller.process_messages(vec![message]).await;
        assert_eq!(second.skipped, 1);
    }

    #[tokio::test]
    async fn test_unchanged_times_update_without_notification() {
        let (mut poller, sink, _store) = poller_with_subs(&["100"]);

        poller.process_messages(vec![timetable_message()]).await;

        // Same times under a new message id: fresh fingerprint, no diff.
        let mut repost = timetable_message();
        repost.id = "test/9".to_string();
        let stats = poller.process_messages(vec![repost]).await;

        assert_eq!(stats.updated, 1);
        assert_eq!(stats.notified, 0);
        assert_eq!(sink.sent.lock().await.len(), 1);
    }
}
