// src/models/mod.rs

//! Domain models for the watcher application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod mosque;
mod timetable;

// Re-export all public types
pub use config::{
    ChannelConfig, Config, DefaultTimes, FeedSelectors, MatcherConfig, NotifyConfig, PollerConfig,
    SubscriptionEntry,
};
pub use mosque::{Mosque, MosqueEntry, MosqueRegistry, NameVariant, Script, VariantEntry};
pub use timetable::{ExtractedTimes, PrayerSlot, Timetable};
