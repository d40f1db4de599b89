//! Service layer for the watcher application.
//!
//! This module contains the business logic for:
//! - Fetching and slicing channel preview feeds
//! - Detecting the dominant script of a message
//! - Attributing messages to registered mosques
//! - Extracting labeled prayer times

pub mod extract;
pub mod feed;
pub mod matcher;
pub mod script;

pub use extract::extract_times;
pub use feed::{FeedClient, FeedMessage};
pub use matcher::{MosqueMatcher, similarity};
pub use script::detect_script;
