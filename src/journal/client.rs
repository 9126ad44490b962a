use crate::journal::JournalError;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};

pub const API_KEY_HEADER: &str = "x-api-key";

/// HTTP client for the journal backend. Every request carries the API key, which is kept out of debug output.
pub fn authenticated_client(api_key: &str) -> Result<Client, JournalError> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(JournalError::MissingApiKey);
    }

    let mut key = HeaderValue::from_str(api_key)?;
    key.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, key);

    Ok(Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .build()?)
}
