use std::{env, time::Duration};

use crate::{BotErr, Result};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings of the bot, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub token: String,
    /// Base URL of the Bot API, without a trailing slash.
    pub api_url: String,
    /// How long a single `getUpdates` call may wait for new messages.
    pub poll_timeout: Duration,
}

impl BotConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Required:
    /// - `BOT_TOKEN`: the bot's API token.
    ///
    /// Optional:
    /// - `TELEGRAM_API_URL`: the API base URL (default: `https://api.telegram.org`).
    /// - `BOT_POLL_TIMEOUT`: long polling timeout in seconds (default: 30).
    ///
    /// # Errors
    /// * `BotErr::MissingToken` if `BOT_TOKEN` is unset or blank.
    /// * `BotErr::InvalidConfig` if `BOT_POLL_TIMEOUT` isn't a whole number of seconds.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`BotConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("BOT_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(BotErr::MissingToken)?;

        let api_url = lookup("TELEGRAM_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let poll_timeout = match lookup("BOT_POLL_TIMEOUT") {
            Some(value) => value
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| BotErr::InvalidConfig {
                    var: "BOT_POLL_TIMEOUT",
                    value,
                })?,
            None => DEFAULT_POLL_TIMEOUT,
        };

        Ok(Self {
            token,
            api_url,
            poll_timeout,
        })
    }
}
