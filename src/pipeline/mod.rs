//! Processing pipeline for channel feeds.
//!
//! - `poll`: per-channel fetch-and-process loop
//! - `diff`: timetable change detection
//! - `fingerprint`: seen-message suppression
//! - `notify`: subscriber fanout

pub mod diff;
pub mod fingerprint;
pub mod notify;
pub mod poll;

pub use diff::{FieldChange, TimetableDiff, diff_timetable};
pub use fingerprint::{FingerprintCache, fingerprint};
pub use notify::{Fanout, format_change_message};
pub use poll::{ChannelPoller, CycleOutcome, PollStats};
