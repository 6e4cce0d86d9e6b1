//! Event router: drives the relay pipeline over the inbound event stream.
//!
//! Events are processed one at a time in arrival order; the router owns
//! the recent-message window and the correlation map, so no locking beyond
//! single-writer ownership is needed. Every external call is independently
//! fault-isolated: a failed attachment relay or post never aborts sibling
//! attachments or the rest of the event.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::GlobalConfig;
use crate::discord::rest::DiscordRest;
use crate::emoji;
use crate::groupme::client::GroupMeClient;
use crate::groupme::upload::ImageRelay;
use crate::models::event::{
    InboundEvent, InboundMessage, MessageSummary, ReactionEvent, ReplyTarget,
};
use crate::relay::commands::{self, BridgeCommand};
use crate::relay::correlation::CorrelationMap;
use crate::relay::formatter::{self, format_outbound};
use crate::relay::window::RecentMessageWindow;
use crate::reply;

/// Characters of quoted message content shown in a reaction notice.
const REACTION_EXCERPT_CHARS: usize = 50;

/// Orchestrates the relay pipeline for one monitored channel.
pub struct EventRouter {
    config: Arc<GlobalConfig>,
    groupme: GroupMeClient,
    images: ImageRelay,
    discord: DiscordRest,
    window: RecentMessageWindow,
    correlation: CorrelationMap,
}

impl EventRouter {
    /// Build a router and its outbound clients from the loaded config.
    #[must_use]
    pub fn new(config: Arc<GlobalConfig>) -> Self {
        let groupme = GroupMeClient::new(config.groupme.clone());
        let images = ImageRelay::new(&config.groupme);
        let discord = DiscordRest::new(
            config.discord.api_base.clone(),
            config.discord.bot_token.clone(),
        );
        Self {
            config,
            groupme,
            images,
            discord,
            window: RecentMessageWindow::new(),
            correlation: CorrelationMap::new(),
        }
    }

    /// Consume inbound events serially until shutdown or channel close.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<InboundEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
                event = events.recv() => {
                    let Some(event) = event else { break };
                    self.handle_event(event).await;
                }
            }
        }
        info!("event router exiting");
    }

    /// Process a single inbound event to completion.
    pub async fn handle_event(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::NewMessage(message) => self.handle_message(message).await,
            InboundEvent::ReactionAdded(reaction) => self.handle_reaction(reaction).await,
        }
    }

    /// Router-owned window of recently processed messages.
    #[must_use]
    pub fn window(&self) -> &RecentMessageWindow {
        &self.window
    }

    /// Mutable access to the correlation map.
    pub fn correlation_mut(&mut self) -> &mut CorrelationMap {
        &mut self.correlation
    }

    async fn handle_message(&mut self, message: InboundMessage) {
        if message.author_is_bot {
            debug!(author = %message.author, "skipping bot message");
            return;
        }
        // Operator commands are answered in-channel, never relayed.
        if let Some(command) = commands::parse(&message.body) {
            self.handle_command(command, &message).await;
            return;
        }
        if message.channel_id != self.config.discord.channel_id {
            return;
        }

        self.window
            .push(&message.channel_id, MessageSummary::from(&message));

        let preview: String = message.body.chars().take(50).collect();
        info!(author = %message.author, preview = %preview, "forwarding message");

        // Structural target wins; when none resolves, the formatter falls
        // back to the textual heuristic and cleans the body itself.
        let structural = self.resolve_reply_target(&message).await;
        let context = structural.as_ref().map(reply::from_structural);

        if message.attachments.is_empty() {
            if message.body.trim().is_empty() {
                // Nothing to relay; not an error.
                return;
            }
            let text = format_outbound(&message.author, &message.body, context.as_ref());
            self.post_logged(&text, None).await;
            return;
        }

        // One post per attachment, each with its own relay outcome.
        for attachment in &message.attachments {
            if attachment.is_image() {
                match self.images.relay(&attachment.url).await {
                    Ok(url) => {
                        let text =
                            format_outbound(&message.author, &message.body, context.as_ref());
                        self.post_logged(&text, Some(&url)).await;
                    }
                    Err(err) => {
                        warn!(%err, url = %attachment.url, "image relay failed");
                        let annotated = format!("{} [Image upload failed]", message.body);
                        let text =
                            format_outbound(&message.author, &annotated, context.as_ref());
                        self.post_logged(&text, None).await;
                    }
                }
            } else {
                let annotated =
                    format!("{} [Attached: {}]", message.body, attachment.filename);
                let text = format_outbound(&message.author, &annotated, context.as_ref());
                self.post_logged(&text, None).await;
            }
        }
    }

    /// Handle an operator command issued from the source platform.
    async fn handle_command(&self, command: BridgeCommand, message: &InboundMessage) {
        let monitored = message.channel_id == self.config.discord.channel_id;
        match command {
            BridgeCommand::Test => {
                if !monitored {
                    self.reply_in_channel(
                        &message.channel_id,
                        "❌ This command only works in the monitored channel.",
                    )
                    .await;
                    return;
                }
                info!(author = %message.author, "bridge test requested");
                let text = format_outbound("Bot Test", "🧪 Bridge test message!", None);
                let confirmation = match self.groupme.post(&text, None).await {
                    Ok(()) => "✅ Test message sent to GroupMe!",
                    Err(err) => {
                        warn!(%err, "bridge test post failed");
                        "❌ Test message failed to reach GroupMe."
                    }
                };
                self.reply_in_channel(&message.channel_id, confirmation).await;
            }
            BridgeCommand::Status => {
                if !monitored {
                    return;
                }
                let connected = if self.config.groupme.bot_id.is_empty() {
                    "❌"
                } else {
                    "✅"
                };
                let text = format!(
                    "🟢 Bot is online and monitoring this channel!\n🔗 Connected to GroupMe: {connected}"
                );
                self.reply_in_channel(&message.channel_id, &text).await;
            }
        }
    }

    /// Reply in a source channel; log failure and continue.
    async fn reply_in_channel(&self, channel_id: &str, content: &str) {
        if let Err(err) = self.discord.post_message(channel_id, content).await {
            warn!(%err, "channel reply failed");
        }
    }

    async fn handle_reaction(&mut self, reaction: ReactionEvent) {
        if reaction.reactor_is_bot {
            return;
        }
        if reaction.channel_id != self.config.discord.channel_id {
            return;
        }
        if !emoji::is_supported(&reaction.emoji) {
            debug!(emoji = %reaction.emoji, "unsupported reaction ignored");
            return;
        }
        if !self.config.reactions_enabled() {
            return;
        }

        let notice = self.compose_reaction_notice(&reaction).await;
        self.post_logged(&notice, None).await;
    }

    /// Compose the reaction-notice text, best-effort.
    ///
    /// Prefers destination-side context when a correlated message id is
    /// known, falls back to the local window, then to a generic
    /// placeholder.
    async fn compose_reaction_notice(&self, reaction: &ReactionEvent) -> String {
        if self.config.context_lookup_enabled() {
            if let Some(dest_id) = self.correlation.dest_for(&reaction.message_id) {
                match self.groupme.find_group_message(dest_id).await {
                    Ok(Some(found)) => {
                        let excerpt =
                            formatter::truncate_excerpt(&found.text, REACTION_EXCERPT_CHARS);
                        return format!(
                            "{} reacted {} to {}: \"{excerpt}\"",
                            reaction.reactor, reaction.emoji, found.name
                        );
                    }
                    Ok(None) => {}
                    Err(err) => warn!(%err, "reaction context lookup failed"),
                }
            }
        }

        if let Some(summary) = self.window.find(&reaction.channel_id, &reaction.message_id) {
            let excerpt = formatter::truncate_excerpt(&summary.body, REACTION_EXCERPT_CHARS);
            return format!(
                "{} reacted {} to {}: \"{excerpt}\"",
                reaction.reactor, reaction.emoji, summary.author
            );
        }

        format!("{} reacted {} to a message", reaction.reactor, reaction.emoji)
    }

    /// Resolve a structural reply reference, swallowing failures.
    ///
    /// A fetch failure deliberately degrades to "no reply framing" rather
    /// than propagating.
    async fn resolve_reply_target(&self, message: &InboundMessage) -> Option<ReplyTarget> {
        let reference = message.reply_ref.as_ref()?;
        match self
            .discord
            .fetch_message(&reference.channel_id, &reference.message_id)
            .await
        {
            Ok(target) => Some(target),
            Err(err) => {
                debug!(%err, message_id = %reference.message_id, "reply target fetch failed");
                None
            }
        }
    }

    /// Post once; log failure and continue. No retry, no escalation.
    async fn post_logged(&self, text: &str, image_url: Option<&str>) {
        if let Err(err) = self.groupme.post(text, image_url).await {
            warn!(%err, "groupme post failed");
        }
    }
}
