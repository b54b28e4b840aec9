//! Pull command implementation.

use davsync_provider::{SyncProvider, SyncTarget};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Downloads a target and writes it to `output`, or to `out` if no file is
/// given.
pub async fn run(
    provider: &dyn SyncProvider,
    target: &SyncTarget,
    local_revision: Option<&str>,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Downloading {}", target);
    let downloaded = provider.download_content(target, local_revision).await?;

    match output {
        Some(path) => {
            fs::write(path, &downloaded.content)?;
            writeln!(out, "✓ Downloaded {}", target)?;
            writeln!(out, "  Path: {:?}", path)?;
            writeln!(out, "  Size: {} bytes", downloaded.content.len())?;
            writeln!(out, "  Revision: {}", downloaded.revision)?;
        }
        None => {
            info!("Revision: {}", downloaded.revision);
            out.write_all(downloaded.content.as_bytes())?;
            writeln!(out)?;
        }
    }
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
    async fn pull_to_file() {
        let transport = Arc::new(MockTransport::new());
        transport.insert("/sync/MAIN.json", "{\"tasks\":[1,2]}");
        let provider = provider(transport);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.json");
        let mut out = Vec::new();
        run(&provider, &SyncTarget::MAIN, None, Some(path.as_path()), &mut out)
            .await
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"tasks\":[1,2]}");
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Revision: \"1-f\""));
    }

    #[tokio::test]
    async fn pull_to_stdout() {
        let transport = Arc::new(MockTransport::new());
        transport.insert("/sync/ARCHIVE.json", "[]");
        let provider = provider(transport);

        let mut out = Vec::new();
        run(&provider, &SyncTarget::ARCHIVE, None, None, &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[]\n");
    }

    #[tokio::test]
    async fn pull_missing_target_fails() {
        let provider = provider(Arc::new(MockTransport::new()));
        let mut out = Vec::new();
        let err = run(&provider, &SyncTarget::MAIN, None, None, &mut out)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
