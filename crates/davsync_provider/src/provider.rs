//! The WebDAV sync provider.
//!
//! Each operation is one linear sequence: begin progress, read the current
//! configuration, resolve the remote path, run the network call(s), end
//! progress. There is no retry; the first failure ends the operation and is
//! returned as a value. Progress ends through [`ProgressGuard`] on every path.

use crate::config::{ConfigSource, WebDavConfig};
use crate::error::{SyncError, SyncResult, TransportError};
use crate::path::resolve_path;
use crate::progress::{ProgressCounter, ProgressGuard, ProgressLabel, ProgressObserver};
use crate::readiness::ReadySignal;
use crate::revision::{extract_revision, parse_http_date, RevisionToken};
use crate::target::SyncTarget;
use crate::transport::{RemoteMetadata, WebDavTransport};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, warn};

/// Provider name reported to the sync engine.
pub const WEBDAV_PROVIDER_ID: &str = "WebDAV";

/// Outcome of a remote revision check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRevision {
    /// The resource exists.
    Present {
        /// Current revision of the resource.
        revision: RevisionToken,
        /// Last modification as epoch milliseconds, if the server sent a
        /// parseable `Last-Modified`.
        remote_modified_at: Option<i64>,
    },
    /// Nothing has been synced for this target yet.
    NoRemoteData,
}

impl RemoteRevision {
    /// Returns the revision if the resource exists.
    pub fn revision(&self) -> Option<&RevisionToken> {
        match self {
            RemoteRevision::Present { revision, .. } => Some(revision),
            RemoteRevision::NoRemoteData => None,
        }
    }
}

/// Content fetched from the remote together with its revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedContent {
    /// Revision of the content, read after the download.
    pub revision: RevisionToken,
    /// The serialized application state.
    pub content: String,
}

/// A remote backend the sync engine reconciles against.
///
/// The engine compares local, remote and last-synced revisions itself; a
/// provider only reports and moves data. None of the operations panic or
/// retry: every failure comes back as a [`SyncError`].
#[async_trait]
pub trait SyncProvider: Send + Sync {
    /// Name of the provider.
    fn id(&self) -> &str;

    /// Returns a signal that turns true once the provider may be used.
    fn ready_signal(&self) -> ReadySignal;

    /// Reports the current remote revision without transferring content.
    ///
    /// `local_revision` is informational.
    async fn get_revision_and_timestamp(
        &self,
        target: &SyncTarget,
        local_revision: Option<&str>,
    ) -> SyncResult<RemoteRevision>;

    /// Downloads the remote content and its revision.
    async fn download_content(
        &self,
        target: &SyncTarget,
        local_revision: Option<&str>,
    ) -> SyncResult<DownloadedContent>;

    /// Replaces the remote content and returns the new revision.
    ///
    /// `client_modified_at` is epoch milliseconds.
    async fn upload_content(
        &self,
        target: &SyncTarget,
        content: &str,
        client_modified_at: i64,
        local_revision: Option<&str>,
        force_overwrite: bool,
    ) -> SyncResult<RevisionToken>;
}

/// Sync provider backed by a WebDAV server.
pub struct WebDavSyncProvider {
    transport: Arc<dyn WebDavTransport>,
    progress: Arc<dyn ProgressObserver>,
    config: watch::Receiver<Option<WebDavConfig>>,
    data_loaded: watch::Receiver<bool>,
}

impl WebDavSyncProvider {
    /// Creates a provider.
    ///
    /// `config` is read afresh on every operation; `data_loaded` flips to
    /// true once the application finished its initial load.
    pub fn new(
        transport: Arc<dyn WebDavTransport>,
        config: watch::Receiver<Option<WebDavConfig>>,
        data_loaded: watch::Receiver<bool>,
    ) -> Self {
        Self {
            transport,
            progress: Arc::new(ProgressCounter::new()),
            config,
            data_loaded,
        }
    }

    /// Creates a provider with a fixed configuration and data already loaded.
    pub fn with_fixed_config(transport: Arc<dyn WebDavTransport>, config: WebDavConfig) -> Self {
        let (_, config) = watch::channel(Some(config));
        let (_, data_loaded) = watch::channel(true);
        Self::new(transport, config, data_loaded)
    }

    /// Sets the progress observer.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    async fn resolve(&self, target: &SyncTarget) -> SyncResult<String> {
        let cfg = self.config.current().await?;
        Ok(resolve_path(target, &cfg.sync_folder_path))
    }

    async fn probe_revision(&self, path: &str) -> SyncResult<RevisionToken> {
        let meta = self
            .transport
            .probe_metadata(path)
            .await
            .map_err(|e| transport_failure("probe", path, e))?;
        revision_of(&meta, path)
    }
}

fn revision_of(meta: &RemoteMetadata, path: &str) -> SyncResult<RevisionToken> {
    extract_revision(meta).map_err(|_| {
        error!(path, "not able to get revision for WebDAV resource");
        SyncError::RevisionUnavailable {
            path: path.to_string(),
        }
    })
}

fn transport_failure(op: &'static str, path: &str, err: TransportError) -> SyncError {
    error!(op, path, status = ?err.status, error = %err.message, "WebDAV request failed");
    SyncError::Transport(err)
}

#[async_trait]
impl SyncProvider for WebDavSyncProvider {
    fn id(&self) -> &str {
        WEBDAV_PROVIDER_ID
    }

    fn ready_signal(&self) -> ReadySignal {
        ReadySignal::new(self.data_loaded.clone(), self.config.clone())
    }

    async fn get_revision_and_timestamp(
        &self,
        target: &SyncTarget,
        local_revision: Option<&str>,
    ) -> SyncResult<RemoteRevision> {
        let _progress = ProgressGuard::begin(self.progress.clone(), ProgressLabel::Probe);
        let path = self.resolve(target).await?;
        debug!(%target, path = %path, ?local_revision, "checking remote revision");

        let meta = match self.transport.probe_metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.is_not_found() => {
                debug!(%target, path = %path, "no remote data");
                return Ok(RemoteRevision::NoRemoteData);
            }
            Err(e) => return Err(transport_failure("probe", &path, e)),
        };

        let remote_modified_at = meta.last_modified.as_deref().and_then(parse_http_date);
        if remote_modified_at.is_none() {
            warn!(path = %path, last_modified = ?meta.last_modified, "unusable last-modified");
        }

        Ok(RemoteRevision::Present {
            revision: revision_of(&meta, &path)?,
            remote_modified_at,
        })
    }

    async fn download_content(
        &self,
        target: &SyncTarget,
        local_revision: Option<&str>,
    ) -> SyncResult<DownloadedContent> {
        let _progress = ProgressGuard::begin(self.progress.clone(), ProgressLabel::Download);
        let path = self.resolve(target).await?;
        debug!(%target, path = %path, ?local_revision, "downloading");

        // TODO: classify 404 as NoRemoteData here once engine callers handle it.
        let content = self
            .transport
            .download(&path, local_revision)
            .await
            .map_err(|e| transport_failure("download", &path, e))?;

        // Read the revision back so it describes exactly what was downloaded.
        let revision = self.probe_revision(&path).await?;
        debug!(%target, %revision, bytes = content.len(), "downloaded");

        Ok(DownloadedContent { revision, content })
    }

    async fn upload_content(
        &self,
        target: &SyncTarget,
        content: &str,
        client_modified_at: i64,
        local_revision: Option<&str>,
        force_overwrite: bool,
    ) -> SyncResult<RevisionToken> {
        let _progress = ProgressGuard::begin(self.progress.clone(), ProgressLabel::Upload);
        let path = self.resolve(target).await?;
        // Unconditional overwrite: conflicts are detected by the engine's
        // three-way comparison. `force_overwrite` has no effect yet.
        debug!(
            %target,
            path = %path,
            client_modified_at,
            ?local_revision,
            force_overwrite,
            bytes = content.len(),
            "uploading"
        );

        self.transport
            .upload(&path, content)
            .await
            .map_err(|e| transport_failure("upload", &path, e))?;

        let revision = self.probe_revision(&path).await?;
        debug!(%target, %revision, "uploaded");
        Ok(revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MetadataStyle, MockTransport};

    fn config() -> WebDavConfig {
        WebDavConfig::new("https://dav.example.com", "/sync").with_credentials("me", "pw")
    }

    fn provider(transport: Arc<MockTransport>) -> (WebDavSyncProvider, Arc<ProgressCounter>) {
        let progress = Arc::new(ProgressCounter::new());
        let provider = WebDavSyncProvider::with_fixed_config(transport, config())
            .with_progress(progress.clone());
        (provider, progress)
    }

    #[tokio::test]
    async fn revision_of_existing_file() {
        let transport = Arc::new(MockTransport::new());
        transport.insert("/sync/MAIN.json", "{}");
        let (provider, progress) = provider(transport);

        let remote = provider
            .get_revision_and_timestamp(&SyncTarget::MAIN, Some("local-rev"))
            .await
            .unwrap();

        match remote {
            RemoteRevision::Present {
                revision,
                remote_modified_at,
            } => {
                assert_eq!(revision, "\"1-2\"");
                assert_eq!(remote_modified_at, Some(1_704_067_201_000));
            }
            RemoteRevision::NoRemoteData => panic!("expected a revision"),
        }
        assert_eq!(progress.last_label(), Some(ProgressLabel::Probe));
        assert_eq!((progress.begun(), progress.ended()), (1, 1));
    }

    #[tokio::test]
    async fn missing_file_is_no_remote_data() {
        let (provider, progress) = provider(Arc::new(MockTransport::new()));
        let remote = provider
            .get_revision_and_timestamp(&SyncTarget::ARCHIVE, None)
            .await
            .unwrap();
        assert_eq!(remote, RemoteRevision::NoRemoteData);
        assert!(remote.revision().is_none());
        assert_eq!(progress.in_flight(), 0);
    }

    #[tokio::test]
    async fn missing_revision_headers_fail_loudly() {
        let transport = Arc::new(MockTransport::new());
        transport.insert("/sync/MAIN.json", "{}");
        transport.set_metadata_style(MetadataStyle::Empty);
        let (provider, progress) = provider(transport);

        let err = provider
            .get_revision_and_timestamp(&SyncTarget::MAIN, None)
            .await
            .unwrap_err();
        assert!(
            matches!(err, SyncError::RevisionUnavailable { ref path } if path == "/sync/MAIN.json")
        );
        assert_eq!(progress.ended(), 1);
    }

    #[tokio::test]
    async fn unparseable_timestamp_keeps_revision() {
        struct OddDates;

        #[async_trait]
        impl WebDavTransport for OddDates {
            async fn probe_metadata(&self, _: &str) -> Result<RemoteMetadata, TransportError> {
                Ok(RemoteMetadata::default()
                    .with_etag("e1")
                    .with_last_modified("not a date"))
            }
            async fn download(&self, _: &str, _: Option<&str>) -> Result<String, TransportError> {
                Ok(String::new())
            }
            async fn upload(&self, _: &str, _: &str) -> Result<(), TransportError> {
                Ok(())
            }
        }

        let provider = WebDavSyncProvider::with_fixed_config(Arc::new(OddDates), config());
        let remote = provider
            .get_revision_and_timestamp(&SyncTarget::MAIN, None)
            .await
            .unwrap();
        assert_eq!(
            remote,
            RemoteRevision::Present {
                revision: extract_revision(&RemoteMetadata::default().with_etag("e1")).unwrap(),
                remote_modified_at: None,
            }
        );
    }

    #[tokio::test]
    async fn download_reads_revision_after_content() {
        let transport = Arc::new(MockTransport::new());
        transport.insert("/sync/MAIN.json", "{\"tasks\":[]}");
        let (provider, progress) = provider(transport.clone());

        let downloaded = provider
            .download_content(&SyncTarget::MAIN, None)
            .await
            .unwrap();
        assert_eq!(downloaded.content, "{\"tasks\":[]}");
        assert_eq!(downloaded.revision, "\"1-c\"");
        assert_eq!(transport.download_count(), 1);
        assert_eq!(transport.probe_count(), 1);
        assert_eq!(progress.last_label(), Some(ProgressLabel::Download));
        assert_eq!(progress.in_flight(), 0);
    }

    #[tokio::test]
    async fn download_of_missing_file_is_an_error() {
        let (provider, progress) = provider(Arc::new(MockTransport::new()));
        let err = provider
            .download_content(&SyncTarget::MAIN, None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(progress.ended(), 1);
    }

    #[tokio::test]
    async fn upload_returns_revision_from_probe() {
        let transport = Arc::new(MockTransport::new());
        let (provider, progress) = provider(transport.clone());

        let revision = provider
            .upload_content(&SyncTarget::MAIN, "data", 1_700_000_000_000, Some("rev1"), false)
            .await
            .unwrap();

        assert_eq!(revision, "\"1-4\"");
        assert_eq!(transport.content("/sync/MAIN.json").as_deref(), Some("data"));
        assert_eq!(transport.upload_count(), 1);
        assert_eq!(transport.probe_count(), 1);
        assert_eq!(progress.last_label(), Some(ProgressLabel::Upload));
        assert_eq!(progress.in_flight(), 0);
    }

    #[tokio::test]
    async fn upload_failure_skips_probe() {
        let transport = Arc::new(MockTransport::new());
        transport.fail_upload(Some(TransportError::http(423, "locked")));
        let (provider, progress) = provider(transport.clone());

        let err = provider
            .upload_content(&SyncTarget::MAIN, "data", 0, None, true)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(423));
        assert_eq!(transport.probe_count(), 0);
        assert_eq!(progress.ended(), 1);
    }

    #[tokio::test]
    async fn folder_change_applies_to_next_call() {
        let transport = Arc::new(MockTransport::new());
        let (cfg_tx, cfg_rx) = watch::channel(Some(config()));
        let (_data_tx, data_rx) = watch::channel(true);
        let provider = WebDavSyncProvider::new(transport.clone(), cfg_rx, data_rx);

        provider
            .upload_content(&SyncTarget::MAIN, "a", 0, None, false)
            .await
            .unwrap();
        cfg_tx
            .send(Some(config().with_sync_folder_path("/moved")))
            .unwrap();
        provider
            .upload_content(&SyncTarget::MAIN, "b", 0, None, false)
            .await
            .unwrap();

        assert_eq!(transport.content("/sync/MAIN.json").as_deref(), Some("a"));
        assert_eq!(transport.content("/moved/MAIN.json").as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn ready_signal_follows_inputs() {
        let (cfg_tx, cfg_rx) = watch::channel(None);
        let (data_tx, data_rx) = watch::channel(false);
        let provider = WebDavSyncProvider::new(Arc::new(MockTransport::new()), cfg_rx, data_rx);
        assert_eq!(provider.id(), "WebDAV");

        let mut ready = provider.ready_signal();
        assert_eq!(ready.next().await, Some(false));

        data_tx.send(true).unwrap();
        cfg_tx.send(Some(config())).unwrap();
        assert_eq!(ready.next().await, Some(true));
    }

    #[tokio::test]
    async fn closed_config_source_fails_operations() {
        let (cfg_tx, cfg_rx) = watch::channel(None);
        let (_data_tx, data_rx) = watch::channel(true);
        drop(cfg_tx);
        let progress = Arc::new(ProgressCounter::new());
        let provider = WebDavSyncProvider::new(Arc::new(MockTransport::new()), cfg_rx, data_rx)
            .with_progress(progress.clone());

        let err = provider
            .get_revision_and_timestamp(&SyncTarget::MAIN, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::ConfigUnavailable));
        assert_eq!(progress.ended(), 1);
    }
}
