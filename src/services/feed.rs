// src/services/feed.rs

//! Channel feed client.
//!
//! Fetches the public HTML preview of a channel and slices it into message
//! blocks using configured CSS selectors. Only the structural shape matters:
//! repeated containers, an inner text element, and an optional photo link.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ChannelConfig, FeedSelectors, PollerConfig};
use crate::utils::resolve_url;

/// Concurrency bound for the one-shot probe across channels.
const PROBE_CONCURRENCY: usize = 4;

/// One message block parsed out of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedMessage {
    /// Feed-provided message identifier (e.g. "channel/123")
    pub id: String,

    /// Message text with block-level breaks preserved as newlines
    pub text: String,

    /// Resolved photo link, when the block carries one
    pub photo: Option<String>,
}

/// HTTP client for channel preview feeds.
pub struct FeedClient {
    client: Client,
    message_sel: Selector,
    text_sel: Selector,
    photo_sel: Selector,
    id_attr: String,
    scan_depth: usize,
}

impl FeedClient {
    /// Build a feed client from poller settings and feed selectors.
    pub fn new(poller: &PollerConfig, selectors: &FeedSelectors) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&poller.user_agent)
            .timeout(Duration::from_secs(poller.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            message_sel: parse_selector(&selectors.message_selector)?,
            text_sel: parse_selector(&selectors.text_selector)?,
            photo_sel: parse_selector(&selectors.photo_selector)?,
            id_attr: selectors.id_attr.clone(),
            scan_depth: poller.scan_depth,
        })
    }

    /// Fetch a channel feed and return its most recent message blocks.
    pub async fn fetch_messages(&self, url: &str) -> Result<Vec<FeedMessage>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("HTTP status {status}")));
        }
        let html = response.text().await?;
        Ok(self.parse_blocks(&html, url))
    }

    /// Parse message blocks out of a feed page.
    ///
    /// Blocks missing a text element are skipped; a page without any usable
    /// block yields an empty list, never an error. The preview lists oldest
    /// first, so the tail of the document is the most recent.
    pub fn parse_blocks(&self, html: &str, base_url: &str) -> Vec<FeedMessage> {
        let document = Html::parse_document(html);

        let mut messages: Vec<FeedMessage> = Vec::new();
        for (index, block) in document.select(&self.message_sel).enumerate() {
            let Some(text_elem) = block.select(&self.text_sel).next() else {
                continue;
            };
            let text = text_elem
                .text()
                .map(str::trim)
                .filter(|chunk| !chunk.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            if text.is_empty() {
                continue;
            }

            let id = block
                .value()
                .attr(&self.id_attr)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{base_url}#{index}"));

            let photo = block
                .select(&self.photo_sel)
                .next()
                .and_then(|link| link.value().attr("href"))
                .and_then(|href| {
                    url::Url::parse(base_url)
                        .ok()
                        .map(|base| resolve_url(&base, href))
                });

            messages.push(FeedMessage { id, text, photo });
        }

        if messages.len() > self.scan_depth {
            messages.drain(..messages.len() - self.scan_depth);
        }
        messages
    }

    /// Fetch every configured channel once, concurrently but bounded.
    ///
    /// Used by the probe command; per-channel failures are reported in the
    /// result rather than aborting the sweep.
    pub async fn probe_all(
        &self,
        channels: &[ChannelConfig],
    ) -> Vec<(String, Result<Vec<FeedMessage>>)> {
        stream::iter(channels)
            .map(|channel| async move {
                let result = self.fetch_messages(&channel.url).await;
                (channel.name.clone(), result)
            })
            .buffer_unordered(PROBE_CONCURRENCY)
            .collect()
            .await
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
