use thiserror::Error;

/// Transport-level failure talking to a chunk source.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chunk service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Logger initialization failed: {0}")]
    Logger(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

