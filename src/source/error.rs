//! Error types for data sources.

use thiserror::Error;

/// Errors delivered on a subscription's error channel.
///
/// Errors are cloned into every consumer that observes them, so payloads are
/// kept as strings rather than wrapping the underlying error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The store refused access to the path.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The store revoked the credentials used by the subscription.
    #[error("Credentials revoked")]
    AuthRevoked,

    /// Connection to the store failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Timeout waiting for the store to respond.
    #[error("Request timed out")]
    Timeout,

    /// Reading the backing file failed.
    #[error("Read error: {0}")]
    Read(String),

    /// A payload could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The store closed the stream.
    #[error("Stream closed")]
    Closed,
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the credential
        let err = err.without_url();
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_connect() {
            SourceError::Connection(err.to_string())
        } else {
            SourceError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}
