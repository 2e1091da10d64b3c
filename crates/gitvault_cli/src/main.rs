//! gitvault command-line interface.
//!
//! Loads configuration, builds the configured sources, runs one backup
//! pass, optionally posts the summary to a webhook, and exits with a code
//! describing how the run went.

mod codes;
mod config;
mod sources;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gitvault::http::reqwest_transport::ReqwestTransport;
use gitvault::{run, Notifier, RunOptions};

use crate::config::Config;

/// HTTP timeout for source APIs and the webhook. Does not apply to git
/// transfers, which have no deadline.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "gitvault", version)]
#[command(about = "Mirror repositories from code-hosting sources to local disk")]
#[command(after_long_help = "\
EXIT CODES:
    0    every repository synced successfully
    1    configuration could not be loaded
    100  one or more repositories failed to sync
    110  a source failed its connectivity test or repository listing
    111  no sources are configured
")]
struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = "gitvault.toml")]
    config: PathBuf,

    /// Directory to store mirrors under (overrides the config file)
    #[arg(short, long)]
    backup_path: Option<PathBuf>,

    /// Record per-repository failures and keep going instead of stopping
    /// at the first one
    #[arg(long)]
    fail_at_end: bool,

    /// Clone bare mirrors without working trees
    #[arg(long)]
    bare: bool,

    /// Disable TLS certificate verification for API requests
    #[arg(long)]
    insecure: bool,

    /// Webhook URL for the run summary (overrides the config file)
    #[arg(long)]
    webhook: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gitvault=info,gitvault_cli=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(path = %cli.config.display(), error = %err, "failed to load configuration");
            process::exit(codes::CONFIG_FAILED);
        }
    };

    if config.sources.is_empty() {
        tracing::error!(path = %cli.config.display(), "no sources configured");
        process::exit(codes::NO_SOURCES);
    }

    let insecure = cli.insecure || config.insecure;
    if insecure {
        tracing::warn!("TLS certificate verification is disabled");
    }

    let transport: Arc<dyn gitvault::http::HttpTransport> =
        match ReqwestTransport::with_options(HTTP_TIMEOUT, insecure) {
            Ok(transport) => Arc::new(transport),
            Err(err) => {
                tracing::error!(error = %err, "failed to build HTTP client");
                process::exit(codes::CONFIG_FAILED);
            }
        };

    let sources = sources::build(&config.sources, Arc::clone(&transport));

    let options = RunOptions {
        backup_root: cli
            .backup_path
            .or_else(|| config.backup_root.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("backup")),
        bare: cli.bare || config.bare,
        fail_at_end: cli.fail_at_end || config.fail_at_end,
    };

    tracing::info!(
        backup_root = %options.backup_root.display(),
        sources = sources.len(),
        bare = options.bare,
        fail_at_end = options.fail_at_end,
        "starting backup run"
    );

    let report = run(&sources, &options).await;

    // Notification is best-effort: a dead webhook must not change how the
    // run itself is reported.
    if let Some(endpoint) = cli.webhook.or(config.webhook_url) {
        let notifier = Notifier::new(transport);
        match notifier.notify(&endpoint, &report).await {
            Ok(()) => tracing::info!("notification delivered"),
            Err(err) => tracing::warn!(error = %err, "notification delivery failed"),
        }
    } else {
        tracing::debug!("no webhook configured, skipping notification");
    }

    process::exit(codes::for_status(report.status));
}
