use std::time::Duration;

use log::debug;
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};

use super::types::{ApiResponse, GetUpdates, Message, SendMessage, Update};
use crate::{BotConfig, Result};

/// Slack added to the long polling timeout before a request is given up on.
const REQUEST_SLACK: Duration = Duration::from_secs(10);

/// A Bot API client bound to a single bot token.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    /// Creates a new `TelegramClient`.
    ///
    /// # Errors
    /// `BotErr::Http` if the HTTP client can't be built.
    pub fn new(config: &BotConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.poll_timeout + REQUEST_SLACK)
            .build()?;

        Ok(Self {
            http,
            base_url: format!("{}/bot{}", config.api_url, config.token),
            poll_timeout: config.poll_timeout,
        })
    }

    /// Waits for updates newer than `offset`, up to the configured polling timeout.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: &["message"],
        };

        self.call("getUpdates", &body).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message> {
        self.call("sendMessage", &SendMessage { chat_id, text }).await
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("calling {method}");

        // Failed calls answer with a JSON envelope too.
        let response = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await?;

        response.json::<ApiResponse<T>>().await?.into_result()
    }
}
