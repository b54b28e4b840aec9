//! Revision extraction from WebDAV metadata.
//!
//! A revision token is picked from the probe headers by fixed precedence:
//!
//! 1. `ETag` - a strong content version, preferred whenever present
//! 2. `OC-ETag` - the ownCloud/Nextcloud equivalent, for servers that expose
//!    it instead of a standard etag
//! 3. `Last-Modified` - last resort; two uploads within the server's
//!    timestamp resolution are indistinguishable
//!
//! Empty header values are treated as absent.

use crate::transport::RemoteMetadata;
use chrono::DateTime;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// An opaque identifier for one content version of a remote resource.
///
/// Tokens are only compared for equality; their content is never
/// interpreted. Quotes around etags are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionToken(String);

impl RevisionToken {
    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RevisionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for RevisionToken {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RevisionToken {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// None of the revision sources were present in the metadata.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no etag, oc-etag or last-modified in metadata")]
pub struct RevisionUnavailable;

/// Derives the revision token from probe metadata.
pub fn extract_revision(meta: &RemoteMetadata) -> Result<RevisionToken, RevisionUnavailable> {
    let etag = non_empty(&meta.etag);
    if etag.is_none() {
        warn!("no etag for WebDAV resource, falling back to a weaker revision source");
    }

    etag.or_else(|| non_empty(&meta.oc_etag))
        .or_else(|| non_empty(&meta.last_modified))
        .map(|rev| RevisionToken(rev.to_string()))
        .ok_or(RevisionUnavailable)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Parses a `Last-Modified` value into epoch milliseconds.
///
/// Accepts the HTTP date format (`Sun, 06 Nov 1994 08:49:37 GMT`) and
/// RFC 3339.
pub fn parse_http_date(value: &str) -> Option<i64> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.timestamp_millis())
}
