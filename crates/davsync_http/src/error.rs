//! Error types for building the HTTP transport.

use davsync_provider::{SyncError, TransportError};
use thiserror::Error;

/// Result type for transport construction.
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors that can occur while setting up the HTTP transport.
///
/// Request failures are not reported here; they are normalized into
/// [`TransportError`] by [`status_error`] and [`request_error`].
#[derive(Error, Debug)]
pub enum HttpError {
    /// The configured base URL cannot be used.
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The configured URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// The configuration is incomplete.
    #[error(transparent)]
    Config(#[from] SyncError),
}

/// Normalizes a non-success response: the status comes from the response.
pub(crate) fn status_error(
    method: &reqwest::Method,
    path: &str,
    status: reqwest::StatusCode,
) -> TransportError {
    TransportError::from_parts(
        None,
        Some(status.as_u16()),
        format!("{} {} failed: {}", method, path, status),
    )
}

/// Normalizes a client error: the status, if any, sits on the error itself.
pub(crate) fn request_error(err: reqwest::Error) -> TransportError {
    let status = err.status().map(|s| s.as_u16());
    let message = if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    };
    TransportError::from_parts(status, None, message)
}
