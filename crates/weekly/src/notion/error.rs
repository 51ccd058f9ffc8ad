//! Error types for the Notion adapter.

use thiserror::Error;

/// Errors that can occur when talking to the Notion API.
#[derive(Debug, Error)]
pub enum NotionError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The integration token was rejected
    #[error("Notion authentication failed: {0}")]
    Auth(String),

    /// The API returned a non-success status
    #[error("Notion API error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body did not have the expected shape
    #[error("malformed Notion response: {0}")]
    Malformed(String),
}
