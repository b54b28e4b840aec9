//! Push command implementation.

use chrono::{DateTime, Utc};
use davsync_provider::{SyncProvider, SyncTarget};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Uploads a JSON file to a target.
///
/// The file must contain valid JSON; the provider itself treats the payload
/// as an opaque string.
pub async fn run(
    provider: &dyn SyncProvider,
    target: &SyncTarget,
    input: &Path,
    local_revision: Option<&str>,
    force: bool,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Uploading {:?} to {}", input, target);

    let content = fs::read_to_string(input)?;
    serde_json::from_str::<serde_json::Value>(&content)
        .map_err(|e| format!("{:?} is not valid JSON: {}", input, e))?;

    let modified_at = fs::metadata(input)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
        .timestamp_millis();

    let revision = provider
        .upload_content(target, &content, modified_at, local_revision, force)
        .await?;

    writeln!(out, "✓ Uploaded {}", target)?;
    writeln!(out, "  Size: {} bytes", content.len())?;
    writeln!(out, "  Revision: {}", revision)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use davsync_provider::{MockTransport, WebDavConfig, WebDavSyncProvider};
    use std::sync::Arc;

    fn provider(transport: Arc<MockTransport>) -> WebDavSyncProvider {
        let config =
            WebDavConfig::new("https://dav.example.com", "/sync").with_credentials("me", "pw");
        WebDavSyncProvider::with_fixed_config(transport, config)
    }

    #[tokio::test]
    async fn push_json_file() {
        let transport = Arc::new(MockTransport::new());
        let provider = provider(transport.clone());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{\"a\":1}").unwrap();

        let mut out = Vec::new();
        run(&provider, &SyncTarget::MAIN, &path, None, false, &mut out)
            .await
            .unwrap();

        assert_eq!(transport.content("/sync/MAIN.json").as_deref(), Some("{\"a\":1}"));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Revision: \"1-7\""));
    }

    #[tokio::test]
    async fn rejects_invalid_json() {
        let transport = Arc::new(MockTransport::new());
        let provider = provider(transport.clone());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let mut out = Vec::new();
        let err = run(&provider, &SyncTarget::MAIN, &path, None, false, &mut out)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
        assert_eq!(transport.upload_count(), 0);
    }
}
