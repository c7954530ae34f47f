use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid product input: {0}")]
    InvalidInput(String),

    #[error("Rate limited by marketplace (HTTP {0})")]
    RateLimited(u16),

    #[error("Marketplace returned HTTP {status}")]
    Upstream { status: u16 },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn from_status(status: u16) -> Self {
        if status == 429 {
            Error::RateLimited(status)
        } else {
            Error::Upstream { status }
        }
    }
}
