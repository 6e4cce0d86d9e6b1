//! Cross-platform message-id correlation.
//!
//! Intended to attribute a later reaction on a relayed message back to its
//! counterpart on the other platform. The bot-post endpoint returns no
//! message id in its accepted response, so the posting path never records
//! an entry and lookups miss in practice; reaction handling treats the map
//! as best-effort and falls back to locally retained content.

use std::collections::HashMap;

/// Bidirectional id↔id map between source and destination messages.
#[derive(Debug, Default)]
pub struct CorrelationMap {
    source_to_dest: HashMap<String, String>,
    dest_to_source: HashMap<String, String>,
}

impl CorrelationMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a correlated pair of message ids.
    pub fn record(&mut self, source_id: &str, dest_id: &str) {
        self.source_to_dest
            .insert(source_id.to_owned(), dest_id.to_owned());
        self.dest_to_source
            .insert(dest_id.to_owned(), source_id.to_owned());
    }

    /// Destination id correlated with a source message, if known.
    #[must_use]
    pub fn dest_for(&self, source_id: &str) -> Option<&str> {
        self.source_to_dest.get(source_id).map(String::as_str)
    }

    /// Source id correlated with a destination message, if known.
    #[must_use]
    pub fn source_for(&self, dest_id: &str) -> Option<&str> {
        self.dest_to_source.get(dest_id).map(String::as_str)
    }
}
