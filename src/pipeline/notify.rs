//! Notification fanout.
//!
//! One formatted message per changed timetable goes to every watcher of the
//! affected mosque. Delivery is best-effort: a failing recipient is logged
//! and skipped, and a short pause between dispatches keeps the sink under
//! its rate limits.

use std::sync::Arc;
use std::time::Duration;

use crate::delivery::{MessageSink, SubscriptionStore};
use crate::models::Mosque;
use crate::pipeline::diff::TimetableDiff;

/// Fans changed timetables out to subscribed recipients.
#[derive(Clone)]
pub struct Fanout {
    sink: Arc<dyn MessageSink>,
    subscriptions: Arc<dyn SubscriptionStore>,
    dispatch_delay: Duration,
}

impl Fanout {
    pub fn new(
        sink: Arc<dyn MessageSink>,
        subscriptions: Arc<dyn SubscriptionStore>,
        dispatch_delay: Duration,
    ) -> Self {
        Self {
            sink,
            subscriptions,
            dispatch_delay,
        }
    }

    /// Notify every watcher of a mosque about a non-empty diff.
    ///
    /// Returns the number of recipients actually delivered to.
    pub async fn notify(&self, mosque: &Mosque, diff: &TimetableDiff) -> usize {
        if !diff.has_changes() {
            return 0;
        }

        let recipients = match self.subscriptions.watchers(mosque.id()).await {
            Ok(recipients) => recipients,
            Err(e) => {
                log::warn!("Subscription lookup failed for {}: {}", mosque.id(), e);
                return 0;
            }
        };

        if recipients.is_empty() {
            log::debug!("No watchers for {}", mosque.id());
            return 0;
        }

        let text = format_change_message(mosque, diff);
        let mut delivered = 0;

        for (index, recipient) in recipients.iter().enumerate() {
            if index > 0 && !self.dispatch_delay.is_zero() {
                tokio::time::sleep(self.dispatch_delay).await;
            }

            match self.sink.deliver(recipient, &text).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    log::warn!("Failed to notify {}: {}", recipient, e);
                }
            }
        }

        log::info!(
            "Notified {}/{} watchers of {} ({} changed slots)",
            delivered,
            recipients.len(),
            mosque.id(),
            diff.change_count()
        );
        delivered
    }
}

/// Format a human-readable change message: one `old → new` line per slot.
pub fn format_change_message(mosque: &Mosque, diff: &TimetableDiff) -> String {
    let mut lines = vec![
        format!("🕌 {}", mosque.display_name()),
        "Namoz vaqtlari yangilandi:".to_string(),
    ];
    for (slot, change) in &diff.changes {
        lines.push(format!("{}: {} → {}", slot.label(), change.old, change.new));
    }
    lines.join("\n")
}
