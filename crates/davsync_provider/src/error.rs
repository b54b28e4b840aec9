//! Error types for the WebDAV sync provider.

use std::fmt;
use thiserror::Error;

/// Result type for sync provider operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// HTTP status the transport reports for a missing resource.
pub const STATUS_NOT_FOUND: u16 = 404;

/// A transport failure, normalized to a single shape at the transport boundary.
///
/// HTTP clients surface status codes in different places: some attach the
/// status to the error itself, others hand back the failed response. Both are
/// folded into `status` here so nothing above the transport has to care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// HTTP status code, if the failure carried one.
    pub status: Option<u16>,
    /// Human-readable description.
    pub message: String,
}

impl TransportError {
    /// Creates an error for a response with the given HTTP status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates an error for a failure that never produced a status
    /// (connection refused, DNS, TLS, timeout).
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Normalizes a failure whose status may sit at the top level of the
    /// error or nested under the failed response.
    ///
    /// The nested response status wins when both are present.
    pub fn from_parts(
        status: Option<u16>,
        response_status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status: response_status.or(status),
            message: message.into(),
        }
    }

    /// Returns true if the remote reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status == Some(STATUS_NOT_FOUND)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for TransportError {}

/// Errors that can occur during sync provider operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network or protocol failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The resource exists but none of `etag`, `oc-etag` or `last-modified`
    /// yielded a revision.
    #[error("not able to get revision for {path}")]
    RevisionUnavailable {
        /// Remote path that was probed.
        path: String,
    },

    /// A sync target name that could escape the sync folder.
    #[error("invalid sync target {name:?}: {reason}")]
    InvalidTarget {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The configuration source closed before producing a value.
    #[error("configuration unavailable")]
    ConfigUnavailable,

    /// A required configuration field is empty.
    #[error("configuration incomplete: {0} is not set")]
    IncompleteConfig(&'static str),
}

impl SyncError {
    /// Returns the HTTP status behind this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Transport(e) => e.status,
            _ => None,
        }
    }

    /// Returns true if this error is a transport-level "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Transport(e) if e.is_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_from_either_shape() {
        let nested = TransportError::from_parts(None, Some(404), "not found");
        assert!(nested.is_not_found());

        let top_level = TransportError::from_parts(Some(404), None, "not found");
        assert!(top_level.is_not_found());

        let neither = TransportError::from_parts(None, None, "connection reset");
        assert_eq!(neither.status, None);
        assert!(!neither.is_not_found());
    }

    #[test]
    fn nested_status_wins() {
        let err = TransportError::from_parts(Some(500), Some(404), "mixed");
        assert_eq!(err.status, Some(404));
    }

    #[test]
    fn error_display() {
        let err = SyncError::from(TransportError::http(500, "internal error"));
        assert_eq!(err.to_string(), "transport error: HTTP 500: internal error");
        assert_eq!(err.status(), Some(500));

        let err = SyncError::from(TransportError::network("connection refused"));
        assert_eq!(err.to_string(), "transport error: connection refused");
        assert_eq!(err.status(), None);

        let err = SyncError::RevisionUnavailable {
            path: "/sync/main.json".into(),
        };
        assert!(err.to_string().contains("/sync/main.json"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_only_for_transport() {
        assert!(SyncError::from(TransportError::http(404, "gone")).is_not_found());
        assert!(!SyncError::ConfigUnavailable.is_not_found());
    }
}
