//! Minimal Telegram Bot API client: long polling for messages and replying to them.

mod client;
mod runner;
mod types;

pub use client::TelegramClient;
pub use runner::Runner;
pub use types::{ApiResponse, Chat, Message, Update};
