//! GroupMe bot-post client and group message lookup.

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::GroupMeConfig;
use crate::{AppError, Result};

/// HTTP status the bot-post endpoint returns for an accepted post.
const ACCEPTED: u16 = 202;

/// Message-list page size used for reaction-context lookups.
const HISTORY_LIMIT: u16 = 100;

/// A message read back from the destination group's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMessage {
    /// Destination-platform message identifier.
    pub id: String,
    /// Display name of the poster.
    pub name: String,
    /// Message text, empty when the message carried only attachments.
    pub text: String,
}

/// Client for the GroupMe bot-post and group endpoints.
///
/// One attempt, one outcome: no retry, no backoff, no queue. Failure is
/// reported synchronously to the caller, which decides fallback behavior.
#[derive(Debug, Clone)]
pub struct GroupMeClient {
    http: reqwest::Client,
    config: GroupMeConfig,
}

impl GroupMeClient {
    /// Create a client for the configured destination.
    #[must_use]
    pub fn new(config: GroupMeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Post text (and optionally one image attachment) via the bot.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PostFailed` for any non-accepted HTTP status and
    /// `AppError::TransportFailed` for network-level faults.
    pub async fn post(&self, text: &str, image_url: Option<&str>) -> Result<()> {
        let mut payload = json!({
            "bot_id": self.config.bot_id,
            "text": text,
        });
        if let Some(url) = image_url {
            payload["attachments"] = json!([{ "type": "image", "url": url }]);
        }

        let response = self
            .http
            .post(format!("{}/bots/post", self.config.api_base))
            .json(&payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != ACCEPTED {
            let body = response.text().await.unwrap_or_default();
            warn!(status, "groupme post rejected");
            return Err(AppError::PostFailed { status, body });
        }

        let preview: String = text.chars().take(50).collect();
        info!(preview = %preview, "message sent to groupme");
        Ok(())
    }

    /// Look up a message by id in the destination group's recent history.
    ///
    /// Returns `Ok(None)` when the id is not present in the latest page.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigurationMissing` when the access token or
    /// group id is not configured, `AppError::FetchFailed` for a
    /// non-success status, and `AppError::ParseFailed` for a malformed
    /// response body.
    pub async fn find_group_message(&self, message_id: &str) -> Result<Option<GroupMessage>> {
        if self.config.access_token.is_empty() {
            return Err(AppError::ConfigurationMissing(
                "GROUPME_ACCESS_TOKEN required for group history".into(),
            ));
        }
        let Some(group_id) = self.config.group_id.as_deref() else {
            return Err(AppError::ConfigurationMissing(
                "groupme.group_id required for group history".into(),
            ));
        };

        let limit = HISTORY_LIMIT.to_string();
        let response = self
            .http
            .get(format!("{}/groups/{group_id}/messages", self.config.api_base))
            .query(&[
                ("token", self.config.access_token.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(AppError::FetchFailed(status));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| AppError::ParseFailed(format!("invalid history response: {err}")))?;
        let messages = body
            .pointer("/response/messages")
            .and_then(Value::as_array)
            .ok_or_else(|| AppError::ParseFailed("missing response.messages".into()))?;

        Ok(messages
            .iter()
            .find(|msg| msg["id"].as_str() == Some(message_id))
            .map(|msg| GroupMessage {
                id: message_id.to_owned(),
                name: msg["name"].as_str().unwrap_or("unknown").to_owned(),
                text: msg["text"].as_str().unwrap_or_default().to_owned(),
            }))
    }
}
