//! Discord REST calls: message lookups for structural reply resolution
//! and in-channel replies for operator commands.

use serde_json::{json, Value};

use crate::models::event::ReplyTarget;
use crate::{AppError, Result};

/// Minimal Discord REST client.
#[derive(Debug, Clone)]
pub struct DiscordRest {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl DiscordRest {
    /// Create a REST client against `api_base` with the given bot token.
    #[must_use]
    pub fn new(api_base: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            bot_token: bot_token.into(),
        }
    }

    /// Fetch the author label and content of a referenced message.
    ///
    /// # Errors
    ///
    /// Returns `AppError::FetchFailed` for a non-success status,
    /// `AppError::ParseFailed` for a malformed body, and
    /// `AppError::TransportFailed` for network-level faults.
    pub async fn fetch_message(&self, channel_id: &str, message_id: &str) -> Result<ReplyTarget> {
        let response = self
            .http
            .get(format!(
                "{}/channels/{channel_id}/messages/{message_id}",
                self.api_base
            ))
            .header("Authorization", format!("Bot {}", self.bot_token))
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(AppError::FetchFailed(status));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| AppError::ParseFailed(format!("invalid message response: {err}")))?;
        let author = body
            .pointer("/author/global_name")
            .and_then(Value::as_str)
            .or_else(|| body.pointer("/author/username").and_then(Value::as_str))
            .ok_or_else(|| AppError::ParseFailed("missing message author".into()))?
            .to_owned();
        let content = body["content"].as_str().unwrap_or_default().to_owned();

        Ok(ReplyTarget { author, content })
    }

    /// Post a plain text message to a channel.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PostFailed` for a non-success status and
    /// `AppError::TransportFailed` for network-level faults.
    pub async fn post_message(&self, channel_id: &str, content: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/channels/{channel_id}/messages", self.api_base))
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&json!({ "content": content }))
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::PostFailed { status, body });
        }
        Ok(())
    }
}
