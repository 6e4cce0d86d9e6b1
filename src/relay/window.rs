//! Bounded per-channel window of recently relayed message summaries.

use std::collections::{HashMap, VecDeque};

use crate::models::event::MessageSummary;

/// Maximum summaries retained per channel.
const WINDOW_CAPACITY: usize = 20;

/// Insertion-ordered trailing window of message summaries, one buffer per
/// channel, oldest evicted beyond capacity.
///
/// Owned exclusively by the event router and mutated only on new-message
/// events. Used for human-facing context display, never for delivery
/// correctness.
#[derive(Debug, Default)]
pub struct RecentMessageWindow {
    channels: HashMap<String, VecDeque<MessageSummary>>,
}

impl RecentMessageWindow {
    /// Create an empty window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a summary to a channel's buffer, evicting the oldest entry
    /// when the buffer exceeds capacity.
    pub fn push(&mut self, channel_id: &str, summary: MessageSummary) {
        let buffer = self.channels.entry(channel_id.to_owned()).or_default();
        buffer.push_back(summary);
        while buffer.len() > WINDOW_CAPACITY {
            buffer.pop_front();
        }
    }

    /// Find a retained summary by message id within one channel.
    #[must_use]
    pub fn find(&self, channel_id: &str, message_id: &str) -> Option<&MessageSummary> {
        self.channels
            .get(channel_id)?
            .iter()
            .find(|summary| summary.message_id == message_id)
    }

    /// Number of summaries currently retained for a channel.
    #[must_use]
    pub fn len(&self, channel_id: &str) -> usize {
        self.channels.get(channel_id).map_or(0, VecDeque::len)
    }

    /// Whether a channel's buffer is empty.
    #[must_use]
    pub fn is_empty(&self, channel_id: &str) -> bool {
        self.len(channel_id) == 0
    }

    /// Retained summaries for a channel in arrival order, oldest first.
    #[must_use]
    pub fn entries(&self, channel_id: &str) -> Vec<&MessageSummary> {
        self.channels
            .get(channel_id)
            .map(|buffer| buffer.iter().collect())
            .unwrap_or_default()
    }
}
