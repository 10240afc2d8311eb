//! Transport error type.

use thiserror::Error;

/// Failure of a remote call.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Connection-level or decoding failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status.
    #[error("remote API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body, or the raw body.
        message: String,
    },

    /// The configured base URL or a joined endpoint path is invalid.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}
