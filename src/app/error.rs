use thiserror::Error;

#[derive(Error, Debug)]
pub enum GondolaError {
    /// Initial page load failed or timed out. Fatal to the whole crawl.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The browser engine failed on one element or call. Callers working
    /// through a batch of entries drop the affected entry and continue.
    #[error("Browser engine error: {0}")]
    Engine(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GondolaError>;
