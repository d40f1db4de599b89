//! Logging message sink.

use async_trait::async_trait;

use crate::delivery::MessageSink;
use crate::error::Result;
use crate::utils::truncate;

/// Sink that logs deliveries instead of sending them anywhere.
///
/// The CLI default; useful for dry runs and for watching the pipeline work
/// before wiring a real bot client in.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl MessageSink for LogSink {
    async fn deliver(&self, recipient: &str, text: &str) -> Result<()> {
        log::info!("[notify] {} <- {}", recipient, truncate(text, 120));
        Ok(())
    }
}
