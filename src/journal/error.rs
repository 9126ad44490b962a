use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("journal API key is not configured")]
    MissingApiKey,
    #[error("journal client set an invalid header value: {0}")]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
    #[error("journal backend is unavailable ({0})")]
    Unavailable(StatusCode),
    #[error("entry '{0}' not found")]
    NotFound(String),
}
