//! davsync CLI
//!
//! Command-line access to WebDAV sync targets.
//!
//! # Commands
//!
//! - `status` - Show the remote revision of a target
//! - `pull` - Download a target
//! - `push` - Upload a JSON file to a target

mod commands;

use clap::{Parser, Subcommand};
use davsync_http::{HttpOptions, HttpTransport};
use davsync_provider::{SyncTarget, WebDavConfig, WebDavSyncProvider};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Sync application state with a WebDAV server.
#[derive(Parser)]
#[command(name = "davsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// WebDAV base URL
    #[arg(global = true, long, env = "DAVSYNC_URL")]
    url: Option<String>,

    /// User name
    #[arg(global = true, short, long, env = "DAVSYNC_USER")]
    user: Option<String>,

    /// Password
    #[arg(global = true, long, env = "DAVSYNC_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Folder holding the synced files
    #[arg(global = true, short, long, env = "DAVSYNC_FOLDER")]
    folder: Option<String>,

    /// Request timeout in seconds
    #[arg(global = true, long, default_value = "30")]
    timeout: u64,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the remote revision of a target
    Status {
        /// Sync target (e.g. MAIN, ARCHIVE)
        target: SyncTarget,

        /// Revision held locally, to compare against
        #[arg(short, long)]
        revision: Option<String>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Download a target
    Pull {
        /// Sync target (e.g. MAIN, ARCHIVE)
        target: SyncTarget,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Revision held locally
        #[arg(short, long)]
        revision: Option<String>,
    },

    /// Upload a JSON file to a target
    Push {
        /// Sync target (e.g. MAIN, ARCHIVE)
        target: SyncTarget,

        /// JSON file to upload
        input: PathBuf,

        /// Revision the upload is based on
        #[arg(short, long)]
        revision: Option<String>,

        /// Overwrite regardless of the remote state
        #[arg(long)]
        force: bool,
    },

    /// Show version information
    Version,
}

impl Cli {
    fn config(&self) -> WebDavConfig {
        WebDavConfig::new(
            self.url.clone().unwrap_or_default(),
            self.folder.clone().unwrap_or_default(),
        )
        .with_credentials(
            self.user.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        )
    }

    fn provider(&self) -> Result<WebDavSyncProvider, Box<dyn std::error::Error>> {
        let config = self.config();
        let options = HttpOptions::default().with_timeout(Duration::from_secs(self.timeout));
        let transport = HttpTransport::with_options(&config, options)?;
        Ok(WebDavSyncProvider::with_fixed_config(
            Arc::new(transport),
            config,
        ))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut out = io::stdout().lock();
    match &cli.command {
        Commands::Status {
            target,
            revision,
            format,
        } => {
            let provider = cli.provider()?;
            commands::status::run(&provider, target, revision.as_deref(), format, &mut out).await?;
        }
        Commands::Pull {
            target,
            output,
            revision,
        } => {
            let provider = cli.provider()?;
            commands::pull::run(
                &provider,
                target,
                revision.as_deref(),
                output.as_deref(),
                &mut out,
            )
            .await?;
        }
        Commands::Push {
            target,
            input,
            revision,
            force,
        } => {
            let provider = cli.provider()?;
            commands::push::run(&provider, target, input, revision.as_deref(), *force, &mut out)
                .await?;
        }
        Commands::Version => {
            writeln!(out, "davsync CLI v{}", env!("CARGO_PKG_VERSION"))?;
        }
    }

    Ok(())
}
