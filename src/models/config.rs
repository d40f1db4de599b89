//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::mosque::MosqueEntry;
use crate::models::timetable::PrayerSlot;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and polling behavior settings
    #[serde(default)]
    pub poller: PollerConfig,

    /// Entity matching settings
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Notification fanout settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// CSS selectors for the channel preview feed
    #[serde(default)]
    pub feed_selectors: FeedSelectors,

    /// Initial timetable values used before the first confident extraction
    #[serde(default)]
    pub default_times: DefaultTimes,

    /// Channel feeds to monitor
    #[serde(default = "defaults::default_channels")]
    pub channels: Vec<ChannelConfig>,

    /// Mosque definitions
    #[serde(default = "defaults::default_mosques")]
    pub mosques: Vec<MosqueEntry>,

    /// Static subscription entries
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionEntry>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    ///
    /// A config that fails here must not start monitoring; an empty registry
    /// or an impossible threshold would make the matcher permanently mute.
    pub fn validate(&self) -> Result<()> {
        if self.poller.user_agent.trim().is_empty() {
            return Err(AppError::validation("poller.user_agent is empty"));
        }
        if self.poller.timeout_secs == 0 {
            return Err(AppError::validation("poller.timeout_secs must be > 0"));
        }
        if self.poller.scan_depth == 0 {
            return Err(AppError::validation("poller.scan_depth must be > 0"));
        }
        if self.poller.fingerprint_capacity == 0 {
            return Err(AppError::validation(
                "poller.fingerprint_capacity must be > 0",
            ));
        }
        if !(self.matcher.threshold > 0.0 && self.matcher.threshold <= 1.0) {
            return Err(AppError::validation(
                "matcher.threshold must be in (0.0, 1.0]",
            ));
        }
        if !(self.matcher.cross_script_weight > 0.0 && self.matcher.cross_script_weight <= 1.0) {
            return Err(AppError::validation(
                "matcher.cross_script_weight must be in (0.0, 1.0]",
            ));
        }
        if self.matcher.confidence_floor == 0 || self.matcher.confidence_floor > PrayerSlot::ALL.len()
        {
            return Err(AppError::validation(
                "matcher.confidence_floor must be between 1 and 5",
            ));
        }
        if self.channels.is_empty() {
            return Err(AppError::validation("No channels defined"));
        }
        for channel in &self.channels {
            url::Url::parse(&channel.url)
                .map_err(|e| AppError::validation(format!("channel '{}': {}", channel.name, e)))?;
        }
        if self.mosques.is_empty() {
            return Err(AppError::validation("No mosques defined"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poller: PollerConfig::default(),
            matcher: MatcherConfig::default(),
            notify: NotifyConfig::default(),
            feed_selectors: FeedSelectors::default(),
            default_times: DefaultTimes::default(),
            channels: defaults::default_channels(),
            mosques: defaults::default_mosques(),
            subscriptions: Vec::new(),
        }
    }
}

/// HTTP client and polling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between successful cycles in seconds
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_secs: u64,

    /// Extended delay after a fetch failure in seconds
    #[serde(default = "defaults::backoff_interval")]
    pub backoff_interval_secs: u64,

    /// How many of the most recent feed messages to inspect per cycle
    #[serde(default = "defaults::scan_depth")]
    pub scan_depth: usize,

    /// Maximum number of message fingerprints kept per channel
    #[serde(default = "defaults::fingerprint_capacity")]
    pub fingerprint_capacity: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            poll_interval_secs: defaults::poll_interval(),
            backoff_interval_secs: defaults::backoff_interval(),
            scan_depth: defaults::scan_depth(),
            fingerprint_capacity: defaults::fingerprint_capacity(),
        }
    }
}

/// Mosque matching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum weighted similarity a fuzzy match must exceed
    #[serde(default = "defaults::threshold")]
    pub threshold: f64,

    /// Weight applied when a variant's script differs from the text's script
    #[serde(default = "defaults::cross_script_weight")]
    pub cross_script_weight: f64,

    /// Minimum populated slots for an extraction to be trusted
    #[serde(default = "defaults::confidence_floor")]
    pub confidence_floor: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::threshold(),
            cross_script_weight: defaults::cross_script_weight(),
            confidence_floor: defaults::confidence_floor(),
        }
    }
}

/// Notification fanout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Delay between dispatches to consecutive recipients in milliseconds
    #[serde(default = "defaults::dispatch_delay")]
    pub dispatch_delay_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            dispatch_delay_ms: defaults::dispatch_delay(),
        }
    }
}

/// CSS selectors describing the channel preview page structure.
///
/// Any HTML feed exposing repeated message containers with an inner text
/// element works; the defaults target the t.me/s public preview markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSelectors {
    /// Selector for one message container
    #[serde(default = "defaults::message_selector")]
    pub message_selector: String,

    /// Selector for the text element inside a container
    #[serde(default = "defaults::text_selector")]
    pub text_selector: String,

    /// Selector for an optional photo link inside a container
    #[serde(default = "defaults::photo_selector")]
    pub photo_selector: String,

    /// Attribute on the container holding the message identifier
    #[serde(default = "defaults::id_attr")]
    pub id_attr: String,
}

impl Default for FeedSelectors {
    fn default() -> Self {
        Self {
            message_selector: defaults::message_selector(),
            text_selector: defaults::text_selector(),
            photo_selector: defaults::photo_selector(),
            id_attr: defaults::id_attr(),
        }
    }
}

/// Initial timetable values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultTimes {
    #[serde(default = "defaults::dawn")]
    pub dawn: String,

    #[serde(default = "defaults::midday")]
    pub midday: String,

    #[serde(default = "defaults::afternoon")]
    pub afternoon: String,

    #[serde(default = "defaults::sunset")]
    pub sunset: String,

    #[serde(default = "defaults::night")]
    pub night: String,
}

impl DefaultTimes {
    /// Initial value for one slot.
    pub fn for_slot(&self, slot: PrayerSlot) -> &str {
        match slot {
            PrayerSlot::Dawn => &self.dawn,
            PrayerSlot::Midday => &self.midday,
            PrayerSlot::Afternoon => &self.afternoon,
            PrayerSlot::Sunset => &self.sunset,
            PrayerSlot::Night => &self.night,
        }
    }
}

impl Default for DefaultTimes {
    fn default() -> Self {
        Self {
            dawn: defaults::dawn(),
            midday: defaults::midday(),
            afternoon: defaults::afternoon(),
            sunset: defaults::sunset(),
            night: defaults::night(),
        }
    }
}

/// One monitored channel feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Short name used in logs
    pub name: String,

    /// URL of the HTML preview feed
    pub url: String,
}

/// One static subscription: a recipient and the mosques they watch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionEntry {
    /// Recipient identifier (e.g. a chat id)
    pub recipient: String,

    /// Watched mosque identifiers
    #[serde(default)]
    pub mosques: Vec<String>,
}

mod defaults {
    use crate::models::mosque::{MosqueEntry, VariantEntry};

    use super::ChannelConfig;

    // Poller defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; azonwatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn poll_interval() -> u64 {
        60
    }
    pub fn backoff_interval() -> u64 {
        300
    }
    pub fn scan_depth() -> usize {
        3
    }
    pub fn fingerprint_capacity() -> usize {
        4096
    }

    // Matcher defaults
    pub fn threshold() -> f64 {
        0.7
    }
    pub fn cross_script_weight() -> f64 {
        0.8
    }
    pub fn confidence_floor() -> usize {
        3
    }

    // Notify defaults
    pub fn dispatch_delay() -> u64 {
        300
    }

    // Feed selector defaults (t.me/s preview markup)
    pub fn message_selector() -> String {
        "div.tgme_widget_message".into()
    }
    pub fn text_selector() -> String {
        "div.tgme_widget_message_text".into()
    }
    pub fn photo_selector() -> String {
        "a.tgme_widget_message_photo_wrap".into()
    }
    pub fn id_attr() -> String {
        "data-post".into()
    }

    // Initial timetable defaults
    pub fn dawn() -> String {
        "04:45".into()
    }
    pub fn midday() -> String {
        "12:50".into()
    }
    pub fn afternoon() -> String {
        "17:45".into()
    }
    pub fn sunset() -> String {
        "19:35".into()
    }
    pub fn night() -> String {
        "21:15".into()
    }

    // Channel defaults
    pub fn default_channels() -> Vec<ChannelConfig> {
        vec![ChannelConfig {
            name: "quqon_taqvim".to_string(),
            url: "https://t.me/s/quqon_namoz_vaqtlari".to_string(),
        }]
    }

    // Mosque defaults
    pub fn default_mosques() -> Vec<MosqueEntry> {
        vec![
            MosqueEntry {
                id: "norbutabek".to_string(),
                display_name: "Norbutabek jome masjidi".to_string(),
                variants: VariantEntry {
                    latin: vec![
                        "norbutabek jome masjidi".to_string(),
                        "norbutabek masjidi".to_string(),
                        "norbutabek".to_string(),
                    ],
                    cyrillic: vec![
                        "норбутабек жоме масжиди".to_string(),
                        "норбутабек".to_string(),
                    ],
                    arabic: vec!["مسجد نوربوتابيك".to_string()],
                },
            },
            MosqueEntry {
                id: "gishtlik".to_string(),
                display_name: "G'ishtlik masjidi".to_string(),
                variants: VariantEntry {
                    latin: vec![
                        "g'ishtlik masjidi".to_string(),
                        "gishtlik masjidi".to_string(),
                        "gishtlik".to_string(),
                    ],
                    cyrillic: vec!["гиштлик масжиди".to_string(), "гиштлик".to_string()],
                    arabic: vec!["مسجد غشتلك".to_string()],
                },
            },
            MosqueEntry {
                id: "zinbardor".to_string(),
                display_name: "Zinbardor masjidi".to_string(),
                variants: VariantEntry {
                    latin: vec!["zinbardor masjidi".to_string(), "zinbardor".to_string()],
                    cyrillic: vec!["зинбардор масжиди".to_string(), "зинбардор".to_string()],
                    arabic: vec!["مسجد زينبردار".to_string()],
                },
            },
        ]
    }
}
