//! HTTP transport implementation.
//!
//! Maps the three transport operations onto plain WebDAV requests:
//! `HEAD` for metadata, `GET` for content and `PUT` for uploads. Requests
//! carry basic auth from the configuration.

use crate::error::{request_error, status_error, HttpError, HttpResult};
use async_trait::async_trait;
use davsync_provider::{RemoteMetadata, TransportError, WebDavConfig, WebDavTransport};
use reqwest::header::{HeaderMap, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use reqwest::{Client, Method, Response, Url};
use std::time::Duration;
use tracing::debug;

/// ownCloud/Nextcloud etag header.
pub const OC_ETAG: &str = "oc-etag";

/// Options for the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// `User-Agent` header.
    pub user_agent: String,
}

impl HttpOptions {
    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("davsync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// WebDAV transport over HTTP(S).
///
/// The base URL and credentials are copied from the configuration at
/// construction. Only the sync folder is read again on every provider call,
/// so a changed URL, user name or password needs a new transport.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    user_name: String,
    password: String,
}

impl HttpTransport {
    /// Creates a transport with default options.
    pub fn new(config: &WebDavConfig) -> HttpResult<Self> {
        Self::with_options(config, HttpOptions::default())
    }

    /// Creates a transport with the given options.
    ///
    /// Fails if a required configuration field is empty or the base URL is
    /// not a usable http(s) URL.
    pub fn with_options(config: &WebDavConfig, options: HttpOptions) -> HttpResult<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url).map_err(|e| HttpError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(HttpError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "expected an http or https URL".into(),
            });
        }

        let client = Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .user_agent(options.user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url,
            user_name: config.user_name.clone(),
            password: config.password.clone(),
        })
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the URL of a remote path below the base URL.
    ///
    /// Each path segment is percent-encoded; empty segments are dropped.
    pub fn url_for(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }

    /// Sends an authenticated request; a `body` is sent as JSON.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&str>,
    ) -> Result<Response, TransportError> {
        let mut request = self
            .client
            .request(method.clone(), self.url_for(path))
            .basic_auth(&self.user_name, Some(&self.password));
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        debug!(%method, path, "sending WebDAV request");
        let response = request.send().await.map_err(request_error)?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "WebDAV response");
        if !status.is_success() {
            return Err(status_error(&method, path, status));
        }
        Ok(response)
    }
}

fn header(headers: &HeaderMap, name: impl reqwest::header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Reads the revision headers of a probe response.
pub fn metadata_from_headers(headers: &HeaderMap) -> RemoteMetadata {
    RemoteMetadata {
        etag: header(headers, ETAG),
        oc_etag: header(headers, OC_ETAG),
        last_modified: header(headers, LAST_MODIFIED),
    }
}

#[async_trait]
impl WebDavTransport for HttpTransport {
    async fn probe_metadata(&self, path: &str) -> Result<RemoteMetadata, TransportError> {
        let response = self.send(Method::HEAD, path, None).await?;
        Ok(metadata_from_headers(response.headers()))
    }

    async fn download(
        &self,
        path: &str,
        _local_revision: Option<&str>,
    ) -> Result<String, TransportError> {
        let response = self.send(Method::GET, path, None).await?;
        response.text().await.map_err(request_error)
    }

    async fn upload(&self, path: &str, content: &str) -> Result<(), TransportError> {
        self.send(Method::PUT, path, Some(content)).await?;
        Ok(())
    }
}
