//! Delivery seams for notification fanout.
//!
//! The watcher core does not talk to a bot API itself; it hands formatted
//! messages to a [`MessageSink`] and asks a [`SubscriptionStore`] who watches
//! which mosque. Production deployments plug their bot client and database
//! in here; the in-crate implementations cover the CLI and tests.

mod log_sink;
mod static_subs;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use log_sink::LogSink;
pub use static_subs::StaticSubscriptions;

/// Trait for message delivery backends.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Deliver a text message to one recipient.
    async fn deliver(&self, recipient: &str, text: &str) -> Result<()>;
}

/// Trait for subscription lookup backends.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Recipients watching the given mosque, in stable order.
    async fn watchers(&self, mosque_id: &str) -> Result<Vec<String>>;
}
