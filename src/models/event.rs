//! Inbound event types consumed by the relay router.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single attachment reference carried by an inbound message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Attachment {
    /// Source-hosted URL for the binary payload.
    pub url: String,
    /// MIME content type as reported by the source platform, if any.
    pub content_type: Option<String>,
    /// Original filename.
    pub filename: String,
}

impl Attachment {
    /// Whether the attachment is image-typed and eligible for relay.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }
}

/// A platform-native link from a message to the message it replies to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ReplyRef {
    /// Channel holding the referenced message.
    pub channel_id: String,
    /// Identifier of the referenced message.
    pub message_id: String,
}

/// A message received from the source platform.
///
/// Immutable once constructed; discarded after processing apart from the
/// bounded summary retained in the recent-message window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct InboundMessage {
    /// Source message identifier.
    pub message_id: String,
    /// Channel the message was posted in.
    pub channel_id: String,
    /// Author display name.
    pub author: String,
    /// Whether the author is a bot account.
    pub author_is_bot: bool,
    /// Raw message body.
    pub body: String,
    /// Attachment references, possibly empty.
    pub attachments: Vec<Attachment>,
    /// Structural reply reference, when the source platform linked one.
    pub reply_ref: Option<ReplyRef>,
    /// Receipt timestamp.
    pub timestamp: DateTime<Utc>,
}

/// A reaction added to a message on the source platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ReactionEvent {
    /// Display name of the reacting user.
    pub reactor: String,
    /// Whether the reactor is a bot account.
    pub reactor_is_bot: bool,
    /// Reaction symbol (emoji).
    pub emoji: String,
    /// Identifier of the reacted-to message.
    pub message_id: String,
    /// Channel holding the reacted-to message.
    pub channel_id: String,
}

/// Author label and truncated content of a structurally-resolved reply target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    /// Display name of the quoted author.
    pub author: String,
    /// Content of the referenced message.
    pub content: String,
}

/// Events delivered by the source-platform feed.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// A new message was posted.
    NewMessage(InboundMessage),
    /// A reaction was added to an existing message.
    ReactionAdded(ReactionEvent),
}

/// Bounded per-channel summary of a processed message, kept for
/// human-facing context display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSummary {
    /// Source message identifier.
    pub message_id: String,
    /// Author display name.
    pub author: String,
    /// Message body, possibly empty for image-only messages.
    pub body: String,
}

impl From<&InboundMessage> for MessageSummary {
    fn from(msg: &InboundMessage) -> Self {
        Self {
            message_id: msg.message_id.clone(),
            author: msg.author.clone(),
            body: msg.body.clone(),
        }
    }
}
