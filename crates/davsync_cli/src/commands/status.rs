//! Status command implementation.

use chrono::{DateTime, Utc};
use davsync_provider::{RemoteRevision, SyncProvider, SyncTarget};
use serde::Serialize;
use std::io::Write;

/// Remote state of one sync target.
#[derive(Debug, Serialize)]
pub struct StatusResult {
    /// Target name.
    pub target: String,
    /// Whether the remote file exists.
    pub exists: bool,
    /// Remote revision, if the file exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    /// Last modification as epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<i64>,
    /// Whether the remote revision matches `--revision`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up_to_date: Option<bool>,
}

/// Runs the status command.
pub async fn run(
    provider: &dyn SyncProvider,
    target: &SyncTarget,
    local_revision: Option<&str>,
    format: &str,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let remote = provider
        .get_revision_and_timestamp(target, local_revision)
        .await?;

    let result = match remote {
        RemoteRevision::Present {
            revision,
            remote_modified_at,
        } => StatusResult {
            target: target.to_string(),
            exists: true,
            up_to_date: local_revision.map(|local| revision == local),
            revision: Some(revision.into_string()),
            modified_at: remote_modified_at,
        },
        RemoteRevision::NoRemoteData => StatusResult {
            target: target.to_string(),
            exists: false,
            revision: None,
            modified_at: None,
            up_to_date: local_revision.map(|_| false),
        },
    };

    match format {
        "json" => writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?,
        _ => print_text_output(&result, out)?,
    }
    Ok(())
}

fn print_text_output(result: &StatusResult, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "Target: {}", result.target)?;
    if !result.exists {
        return writeln!(out, "  No remote data");
    }
    if let Some(revision) = &result.revision {
        writeln!(out, "  Revision: {}", revision)?;
    }
    match result.modified_at.and_then(DateTime::<Utc>::from_timestamp_millis) {
        Some(at) => writeln!(out, "  Modified: {}", at.to_rfc3339())?,
        None => writeln!(out, "  Modified: unknown")?,
    }
    if let Some(up_to_date) = result.up_to_date {
        writeln!(out, "  Up to date: {}", if up_to_date { "yes" } else { "no" })?;
    }
    Ok(())
}
