//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Nested Discord configuration for the monitored source channel.
///
/// The bot token is loaded at runtime from the `DISCORD_BOT_TOKEN`
/// environment variable, not from the TOML config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DiscordConfig {
    /// Channel whose messages and reactions are relayed.
    pub channel_id: String,
    /// REST API base URL; overridable for tests.
    #[serde(default = "default_discord_api_base")]
    pub api_base: String,
    /// Gateway bot token (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

/// Nested GroupMe configuration for the destination group.
///
/// The image-service access token is loaded at runtime from the
/// `GROUPME_ACCESS_TOKEN` environment variable. When absent, image relay
/// and reaction features are disabled rather than failing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GroupMeConfig {
    /// Bot identifier used by the bot-post endpoint.
    pub bot_id: String,
    /// Group identifier for reaction-context lookups; absent disables them.
    #[serde(default)]
    pub group_id: Option<String>,
    /// Bot-post API base URL; overridable for tests.
    #[serde(default = "default_groupme_api_base")]
    pub api_base: String,
    /// Image-service base URL; overridable for tests.
    #[serde(default = "default_groupme_image_base")]
    pub image_base: String,
    /// Image-service access token (populated at runtime).
    #[serde(skip)]
    pub access_token: String,
}

fn default_discord_api_base() -> String {
    "https://discord.com/api/v10".into()
}

fn default_groupme_api_base() -> String {
    "https://api.groupme.com/v3".into()
}

fn default_groupme_image_base() -> String {
    "https://image.groupme.com".into()
}

fn default_http_port() -> u16 {
    8000
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Discord source settings.
    pub discord: DiscordConfig,
    /// GroupMe destination settings.
    pub groupme: GroupMeConfig,
    /// HTTP port for the health endpoint.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load credentials from environment variables.
    ///
    /// `DISCORD_BOT_TOKEN` is required. `GROUPME_ACCESS_TOKEN` is optional;
    /// when absent, image relay and reaction features stay disabled.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the Discord bot token is not set.
    pub fn load_credentials(&mut self) -> Result<()> {
        self.discord.bot_token = env::var("DISCORD_BOT_TOKEN")
            .map_err(|_| AppError::Config("DISCORD_BOT_TOKEN env var not set".into()))?;
        match env::var("GROUPME_ACCESS_TOKEN") {
            Ok(token) if !token.is_empty() => self.groupme.access_token = token,
            _ => {
                warn!("GROUPME_ACCESS_TOKEN not set; image relay and reactions disabled");
            }
        }
        Ok(())
    }

    /// Whether image relay is available (requires the image-service token).
    #[must_use]
    pub fn image_support(&self) -> bool {
        !self.groupme.access_token.is_empty()
    }

    /// Whether reaction relay is available.
    #[must_use]
    pub fn reactions_enabled(&self) -> bool {
        !self.groupme.access_token.is_empty()
    }

    /// Whether reaction-context lookups against the group are possible.
    #[must_use]
    pub fn context_lookup_enabled(&self) -> bool {
        self.reactions_enabled() && self.groupme.group_id.is_some()
    }

    fn validate(&self) -> Result<()> {
        if self.groupme.bot_id.trim().is_empty() {
            return Err(AppError::Config("groupme.bot_id must not be empty".into()));
        }
        if self.discord.channel_id.trim().is_empty() {
            return Err(AppError::Config(
                "discord.channel_id must not be empty".into(),
            ));
        }
        Ok(())
    }
}
