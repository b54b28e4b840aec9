//! Transport layer abstraction for WebDAV operations.

use crate::error::TransportError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Attributes returned by a metadata probe (HEAD) of a remote resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteMetadata {
    /// Standard `ETag` header.
    pub etag: Option<String>,
    /// ownCloud/Nextcloud `OC-ETag` header, exposed by some servers instead
    /// of a standard etag.
    pub oc_etag: Option<String>,
    /// `Last-Modified` header, as formatted by the server.
    pub last_modified: Option<String>,
}

impl RemoteMetadata {
    /// Sets the etag.
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Sets the `OC-ETag`.
    pub fn with_oc_etag(mut self, oc_etag: impl Into<String>) -> Self {
        self.oc_etag = Some(oc_etag.into());
        self
    }

    /// Sets the last-modified timestamp.
    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }
}

/// A WebDAV transport performs HEAD/GET/PUT against the remote store.
///
/// This trait abstracts the HTTP layer, allowing for different implementations
/// (reqwest, an in-memory store for testing, etc.). Implementations must
/// normalize every failure into a [`TransportError`], carrying the HTTP status
/// whenever the server produced one.
#[async_trait]
pub trait WebDavTransport: Send + Sync {
    /// Probes the metadata of a resource without transferring its content.
    async fn probe_metadata(&self, path: &str) -> Result<RemoteMetadata, TransportError>;

    /// Downloads the content of a resource.
    ///
    /// `local_revision` is the revision the caller already holds, if any.
    async fn download(
        &self,
        path: &str,
        local_revision: Option<&str>,
    ) -> Result<String, TransportError>;

    /// Replaces the content of a resource, creating it if needed.
    async fn upload(&self, path: &str, content: &str) -> Result<(), TransportError>;
}

/// Which headers the [`MockTransport`] exposes on a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataStyle {
    /// `ETag` and `Last-Modified`.
    #[default]
    Etag,
    /// `OC-ETag` and `Last-Modified`, no standard etag.
    OcEtag,
    /// Only `Last-Modified`.
    LastModifiedOnly,
    /// No revision headers at all.
    Empty,
}

#[derive(Debug, Clone)]
struct StoredFile {
    content: String,
    version: u64,
    modified: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MockState {
    files: HashMap<String, StoredFile>,
    next_version: u64,
    style: MetadataStyle,
    probe_failure: Option<TransportError>,
    download_failure: Option<TransportError>,
    upload_failure: Option<TransportError>,
    probes: usize,
    downloads: usize,
    uploads: usize,
}

/// An in-memory transport for testing.
///
/// Every upload bumps a version counter that feeds the generated etag and
/// last-modified values, so revisions change exactly when content is written.
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    /// Creates an empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a file directly, bypassing upload accounting.
    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        let mut state = self.state.lock();
        state.next_version += 1;
        let version = state.next_version;
        state.files.insert(
            path.into(),
            StoredFile {
                content: content.into(),
                version,
                modified: mock_time(version),
            },
        );
    }

    /// Returns the stored content of a file.
    pub fn content(&self, path: &str) -> Option<String> {
        self.state.lock().files.get(path).map(|f| f.content.clone())
    }

    /// Sets which headers probes expose.
    pub fn set_metadata_style(&self, style: MetadataStyle) {
        self.state.lock().style = style;
    }

    /// Makes every probe fail with the given error until cleared.
    pub fn fail_probe(&self, error: Option<TransportError>) {
        self.state.lock().probe_failure = error;
    }

    /// Makes every download fail with the given error until cleared.
    pub fn fail_download(&self, error: Option<TransportError>) {
        self.state.lock().download_failure = error;
    }

    /// Makes every upload fail with the given error until cleared.
    pub fn fail_upload(&self, error: Option<TransportError>) {
        self.state.lock().upload_failure = error;
    }

    /// Number of probes issued so far.
    pub fn probe_count(&self) -> usize {
        self.state.lock().probes
    }

    /// Number of downloads issued so far.
    pub fn download_count(&self) -> usize {
        self.state.lock().downloads
    }

    /// Number of uploads issued so far.
    pub fn upload_count(&self) -> usize {
        self.state.lock().uploads
    }
}

fn mock_time(version: u64) -> DateTime<Utc> {
    let epoch = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default();
    epoch + Duration::seconds(version as i64)
}

fn mock_metadata(file: &StoredFile, style: MetadataStyle) -> RemoteMetadata {
    let etag = format!("\"{:x}-{:x}\"", file.version, file.content.len());
    let last_modified = file
        .modified
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();
    let meta = RemoteMetadata::default();
    match style {
        MetadataStyle::Etag => meta.with_etag(etag).with_last_modified(last_modified),
        MetadataStyle::OcEtag => meta.with_oc_etag(etag).with_last_modified(last_modified),
        MetadataStyle::LastModifiedOnly => meta.with_last_modified(last_modified),
        MetadataStyle::Empty => meta,
    }
}

#[async_trait]
impl WebDavTransport for MockTransport {
    async fn probe_metadata(&self, path: &str) -> Result<RemoteMetadata, TransportError> {
        let mut state = self.state.lock();
        state.probes += 1;
        if let Some(err) = state.probe_failure.clone() {
            return Err(err);
        }
        state
            .files
            .get(path)
            .map(|file| mock_metadata(file, state.style))
            .ok_or_else(|| TransportError::http(404, format!("{} not found", path)))
    }

    async fn download(
        &self,
        path: &str,
        _local_revision: Option<&str>,
    ) -> Result<String, TransportError> {
        let mut state = self.state.lock();
        state.downloads += 1;
        if let Some(err) = state.download_failure.clone() {
            return Err(err);
        }
        state
            .files
            .get(path)
            .map(|file| file.content.clone())
            .ok_or_else(|| TransportError::http(404, format!("{} not found", path)))
    }

    async fn upload(&self, path: &str, content: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.uploads += 1;
        if let Some(err) = state.upload_failure.clone() {
            return Err(err);
        }
        state.next_version += 1;
        let version = state.next_version;
        state.files.insert(
            path.to_string(),
            StoredFile {
                content: content.to_string(),
                version,
                modified: mock_time(version),
            },
        );
        Ok(())
    }
}
