//! Client error types

use thiserror::Error;

/// Client error type
///
/// Only transport-level problems end up here. A non-2xx status is a
/// successful call whose [`RawResponse`](crate::RawResponse) the caller
/// has to inspect.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base URL could not be parsed
    #[error("Invalid URL: {0}")]
    Url(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Entity tag not recognized
    #[error(transparent)]
    UnknownEntityKind(#[from] shared::UnknownEntityKind),

    /// Body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
