//! Error types for feed clients.

use thiserror::Error;

/// Batch-level failures of a single feed fetch.
///
/// Any of these aborts the current poll cycle as a whole. Individual bad
/// records are not errors; the normalizer drops them.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The feed answered with a non-success status.
    #[error("Feed returned status {0}")]
    Status(u16),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The response envelope is missing or does not have the expected shape.
    #[error("Malformed feed payload: {0}")]
    Payload(String),
}

impl FetchError {
    /// True for envelope/shape problems, false for transport problems.
    pub fn is_payload(&self) -> bool {
        matches!(self, FetchError::Payload(_))
    }
}

#[cfg(feature = "thingspeak")]
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the read key as a query parameter
        let err = err.without_url();
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if err.is_decode() {
            FetchError::Payload(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Payload(err.to_string())
    }
}
