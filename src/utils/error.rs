use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Decode error for {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid minimum price comment '{comment}'")]
    ThresholdParse { comment: String },

    #[error("Parsing error: {message}")]
    Parse { message: String },

    #[error("Notification delivery failed: {0}")]
    NotificationDelivery(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn parse(message: impl Into<String>) -> Self {
        AppError::Parse { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
