//! # davsync provider
//!
//! WebDAV sync provider for a pluggable multi-backend sync layer.
//!
//! This crate provides:
//! - Revision extraction from HEAD metadata (`ETag` → `OC-ETag` → `Last-Modified`)
//! - Remote path resolution for sync targets
//! - The `SyncProvider` interface and its WebDAV implementation
//! - Scoped progress signaling and a readiness signal
//! - Transport abstraction with an in-memory mock
//!
//! ## Architecture
//!
//! The provider answers three questions for a generic sync engine:
//! 1. What is the current remote revision?
//! 2. What is the remote content (and its revision)?
//! 3. Replace the remote content (and report the new revision).
//!
//! The engine performs the three-way reconciliation (local, remote,
//! last-synced revision); the provider knows nothing about it.
//!
//! ## Key Invariants
//!
//! - Repeated probes of unmodified remote state yield equal revisions
//! - Revisions after a download or upload are read back from the server
//! - A missing resource is a value (`NoRemoteData`), not an error
//! - Every failure is returned, never panicked or retried
//! - Progress always ends, on success and on failure

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod path;
mod progress;
mod provider;
mod readiness;
mod revision;
mod target;
mod transport;

pub use config::{ConfigSource, WebDavConfig};
pub use error::{SyncError, SyncResult, TransportError, STATUS_NOT_FOUND};
pub use path::{resolve_path, FILE_SUFFIX};
pub use progress::{ProgressCounter, ProgressGuard, ProgressLabel, ProgressObserver};
pub use provider::{
    DownloadedContent, RemoteRevision, SyncProvider, WebDavSyncProvider, WEBDAV_PROVIDER_ID,
};
pub use readiness::ReadySignal;
pub use revision::{extract_revision, parse_http_date, RevisionToken, RevisionUnavailable};
pub use target::SyncTarget;
pub use transport::{MetadataStyle, MockTransport, RemoteMetadata, WebDavTransport};
