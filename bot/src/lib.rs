pub mod config;
pub mod error;
pub mod handler;
pub mod parser;
pub mod telegram;

pub use config::BotConfig;
pub use error::{BotErr, Result};
pub use handler::Handler;
pub use parser::parse_kv_message;
