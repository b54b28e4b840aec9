//! Configuration for the WebDAV provider.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

/// Connection and layout settings for the WebDAV remote.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebDavConfig {
    /// Server base URL (e.g., "https://cloud.example.com/remote.php/dav/files/me").
    pub base_url: String,
    /// User name for basic auth.
    pub user_name: String,
    /// Password for basic auth.
    pub password: String,
    /// Folder below the base URL holding the synced files.
    pub sync_folder_path: String,
}

impl WebDavConfig {
    /// Creates a new configuration.
    pub fn new(base_url: impl Into<String>, sync_folder_path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sync_folder_path: sync_folder_path.into(),
            ..Self::default()
        }
    }

    /// Sets basic-auth credentials.
    pub fn with_credentials(
        mut self,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.user_name = user_name.into();
        self.password = password.into();
        self
    }

    /// Sets the sync folder.
    pub fn with_sync_folder_path(mut self, path: impl Into<String>) -> Self {
        self.sync_folder_path = path.into();
        self
    }

    /// Returns the first required field that is empty.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("baseUrl", &self.base_url),
            ("userName", &self.user_name),
            ("password", &self.password),
            ("syncFolderPath", &self.sync_folder_path),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
    }

    /// Returns true if every required field is set.
    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }

    /// Fails with [`SyncError::IncompleteConfig`] naming the first empty field.
    pub fn validate(&self) -> SyncResult<()> {
        match self.missing_field() {
            Some(field) => Err(SyncError::IncompleteConfig(field)),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for WebDavConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDavConfig")
            .field("base_url", &self.base_url)
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .field("sync_folder_path", &self.sync_folder_path)
            .finish()
    }
}

/// Supplies the current configuration to each provider operation.
///
/// The provider reads it once per call and never caches it, so changes made
/// by the user take effect on the next operation.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Returns the first currently-available configuration.
    async fn current(&self) -> SyncResult<WebDavConfig>;
}

/// An observable configuration; `None` until settings are loaded.
///
/// Waits for the first `Some` value and fails once the sender is gone
/// without ever having produced one.
#[async_trait]
impl ConfigSource for watch::Receiver<Option<WebDavConfig>> {
    async fn current(&self) -> SyncResult<WebDavConfig> {
        let mut rx = self.clone();
        let cfg = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| SyncError::ConfigUnavailable)?;
        cfg.clone().ok_or(SyncError::ConfigUnavailable)
    }
}
