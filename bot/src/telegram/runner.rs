use std::{sync::Arc, time::Duration};

use log::{info, warn};
use tokio::{task::JoinSet, time};

use super::TelegramClient;
use crate::{Handler, Result};

/// Pause after a failed poll before the next one.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Long polls the Bot API and answers every message on its own task.
#[derive(Debug)]
pub struct Runner {
    client: Arc<TelegramClient>,
    handler: Arc<Handler>,
    offset: Option<i64>,
}

impl Runner {
    pub fn new(client: Arc<TelegramClient>, handler: Arc<Handler>) -> Self {
        Self {
            client,
            handler,
            offset: None,
        }
    }

    /// The offset the next poll asks for, one past the last update seen.
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Fetches one batch of updates and spawns a task answering each text message.
    ///
    /// # Returns
    /// The spawned tasks.
    ///
    /// # Errors
    /// If fetching the updates fails, the offset is left untouched then.
    pub async fn poll(&mut self) -> Result<JoinSet<()>> {
        let updates = self.client.get_updates(self.offset).await?;
        let mut tasks = JoinSet::new();

        for update in updates {
            self.offset = Some(self.offset.map_or(update.update_id + 1, |offset| {
                offset.max(update.update_id + 1)
            }));

            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text else {
                continue;
            };

            let chat_id = message.chat.id;
            let client = Arc::clone(&self.client);
            let handler = Arc::clone(&self.handler);

            tasks.spawn(async move {
                let Some(reply) = handler.respond(&text) else {
                    return;
                };

                info!(chat_id; "answering message");
                if let Err(e) = client.send_message(chat_id, &reply).await {
                    warn!("couldn't reply to chat {chat_id}: {e}");
                }
            });
        }

        Ok(tasks)
    }

    /// Polls forever, logging failed polls.
    pub async fn run(mut self) {
        info!("polling for messages");

        loop {
            match self.poll().await {
                Ok(mut tasks) => tasks.detach_all(),
                Err(e) => {
                    warn!("polling failed: {e}");
                    time::sleep(RETRY_DELAY).await;
                }
            }
        }
    }
}
