use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    HttpRequestError(#[from] reqwest::Error),

    #[error("'{url}' returned HTTP {status}")]
    FetchError {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("no results found for '{0}'")]
    NotFound(String),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("page is missing required field '{0}'")]
    MalformedPage(&'static str),

    #[error("failed to download '{url}': {reason}")]
    DownloadError { url: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Other error: {0}")]
    Other(String),
}
