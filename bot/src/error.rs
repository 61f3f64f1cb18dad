use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use machine_learning::MlErr;

pub type Result<T> = std::result::Result<T, BotErr>;

/// The bot's error type.
#[derive(Debug)]
pub enum BotErr {
    /// `BOT_TOKEN` is unset or empty.
    MissingToken,
    /// An environment variable holds an unusable value.
    InvalidConfig { var: &'static str, value: String },
    Http(reqwest::Error),
    /// The Bot API answered with `ok: false`.
    Api {
        code: Option<i64>,
        description: String,
    },
    Ml(MlErr),
    Io(io::Error),
}

impl Display for BotErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotErr::MissingToken => write!(f, "BOT_TOKEN is not set in the environment"),
            BotErr::InvalidConfig { var, value } => {
                write!(f, "invalid value '{value}' for {var}")
            }
            BotErr::Http(e) => write!(f, "http error: {e}"),
            BotErr::Api {
                code: Some(code),
                description,
            } => write!(f, "bot api error {code}: {description}"),
            BotErr::Api {
                code: None,
                description,
            } => write!(f, "bot api error: {description}"),
            BotErr::Ml(e) => write!(f, "{e}"),
            BotErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for BotErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BotErr::Http(e) => Some(e),
            BotErr::Ml(e) => Some(e),
            BotErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BotErr {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<MlErr> for BotErr {
    fn from(value: MlErr) -> Self {
        Self::Ml(value)
    }
}

impl From<io::Error> for BotErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
