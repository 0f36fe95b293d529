//! Remote API error types.

use thiserror::Error;

/// Errors that can occur when talking to the remote API.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an unexpected status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Failed to parse an API response.
    #[error("parse error: {0}")]
    Parse(String),

    /// A base or page URL could not be used.
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The API token cannot be sent as a header value.
    #[error("API token contains characters not allowed in a header")]
    InvalidToken,

    /// A fetched record carries no `id` to address it by.
    #[error("{endpoint} record has no id")]
    MissingIdentity { endpoint: String },

    /// A filter expected to match at most one record matched several.
    #[error("ambiguous filter on {endpoint}: matched {count} records")]
    Conflict {
        /// Endpoint the filter ran against.
        endpoint: String,
        /// Number of matching records.
        count: usize,
    },
}
