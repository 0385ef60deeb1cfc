//! # Chunked Fan-out Dispatcher
//!
//! Broadcast commands mention many users at once, but a single Telegram
//! message only notifies a limited number of them. The dispatcher splits an
//! ordered list of mentions into contiguous batches and sends one message
//! per batch. Paged replies such as the member table go through the same
//! in-order sender.
//!
//! ## Guarantees
//!
//! - Batches preserve the original order; concatenating them gives the input back
//! - Every batch except possibly the last holds exactly `batch_size` mentions
//! - Batches are sent one at a time, in order
//! - A batch that fails to send is logged and skipped; it is not retried and
//!   the remaining batches are still sent

use tracing::{debug, warn};

use crate::bot::messenger::Messenger;
use crate::config::MENTION_BATCH_SIZE;

/// Outcome of one fan-out run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutReport {
    /// Number of batches the mentions were split into
    pub batches: usize,
    /// Batches delivered successfully
    pub sent: usize,
    /// Zero-based indices of batches that failed to send
    pub failed: Vec<usize>,
}

impl FanOutReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FanOutDispatcher {
    batch_size: usize,
}

impl Default for FanOutDispatcher {
    fn default() -> Self {
        Self::new(MENTION_BATCH_SIZE)
    }
}

impl FanOutDispatcher {
    /// A zero batch size is clamped to one
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Contiguous batches of at most `batch_size` items
    pub fn chunk<'a, T>(&self, items: &'a [T]) -> Vec<&'a [T]> {
        items.chunks(self.batch_size).collect()
    }

    /// Send one HTML message per batch, built by `format_batch`
    ///
    /// The caller is responsible for rejecting an empty mention list before
    /// calling this; an empty list sends nothing.
    pub async fn dispatch<F>(
        &self,
        messenger: &dyn Messenger,
        chat_id: i64,
        mentions: &[String],
        format_batch: F,
    ) -> FanOutReport
    where
        F: Fn(&[String]) -> String,
    {
        let messages: Vec<String> = self
            .chunk(mentions)
            .into_iter()
            .map(|batch| format_batch(batch))
            .collect();
        send_in_order(messenger, chat_id, &messages).await
    }
}

/// Send prebuilt HTML messages one at a time, skipping any that fail
pub async fn send_in_order(
    messenger: &dyn Messenger,
    chat_id: i64,
    messages: &[String],
) -> FanOutReport {
    let mut report = FanOutReport {
        batches: messages.len(),
        ..Default::default()
    };

    for (index, message) in messages.iter().enumerate() {
        match messenger.send_html(chat_id, message).await {
            Ok(()) => {
                debug!(chat_id, batch = index, chars = message.chars().count(), "Batch sent");
                report.sent += 1;
            }
            Err(e) => {
                warn!(chat_id, batch = index, error = %e, "Batch failed to send, skipping");
                report.failed.push(index);
            }
        }
    }

    report
}

/// Caption on its own line, then the batch's mentions separated by single spaces
pub fn caption_batch(caption: &str, batch: &[String]) -> String {
    format!("{}\n{}", caption, batch.join(" "))
}
