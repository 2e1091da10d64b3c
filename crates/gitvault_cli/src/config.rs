//! Configuration file support for gitvault.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `GITVAULT_`, e.g., `GITVAULT_BACKUP_ROOT`)
//! 3. Config file (path from `--config`, `./gitvault.toml` by default)
//!
//! Unlike most settings, sources can only come from the file: they are an
//! ordered list and the order is the processing order.
//!
//! Example config file:
//! ```toml
//! backup_root = "/var/backups/git"
//! webhook_url = "https://hooks.slack.com/services/T00/B00/XXX"
//! fail_at_end = true
//!
//! [[sources]]
//! kind = "github"
//! token = "ghp_..."
//! orgs = ["my-org"]
//!
//! [[sources]]
//! kind = "gitlab"
//! host = "https://gitlab.example.com"
//! token = "glpat-..."
//! ```

use std::path::Path;

use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory mirrors are stored under.
    pub backup_root: Option<String>,
    /// Webhook endpoint for the run summary. No webhook, no notification.
    pub webhook_url: Option<String>,
    /// Record per-repository failures and keep going.
    pub fail_at_end: bool,
    /// Clone bare mirrors without working trees.
    pub bare: bool,
    /// Disable TLS certificate verification for API requests.
    pub insecure: bool,
    /// Hosting sources, processed in order.
    pub sources: Vec<SourceConfig>,
}

/// One configured hosting source, tagged by provider kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    Github(GitHubSourceConfig),
    Gitlab(GitLabSourceConfig),
}

/// GitHub source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubSourceConfig {
    /// Name used for the on-disk directory and log lines.
    /// Defaults to "github".
    pub name: Option<String>,
    /// GitHub API token.
    pub token: String,
    /// API host override for GitHub Enterprise (e.g., "https://ghe.example/api/v3").
    pub api_host: Option<String>,
    /// Organizations to mirror in addition to the token's own repositories.
    #[serde(default)]
    pub orgs: Vec<String>,
}

/// GitLab source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabSourceConfig {
    /// Name used for the on-disk directory and log lines.
    /// Defaults to "gitlab".
    pub name: Option<String>,
    /// GitLab personal access token.
    pub token: String,
    /// Host override for self-hosted instances (e.g., "https://git.example.com").
    pub host: Option<String>,
}

impl Config {
    /// Load configuration from `path`, layered with `GITVAULT_` environment
    /// variables.
    ///
    /// A missing or malformed file is an error; running a backup tool
    /// against an accidental empty default would silently back up nothing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let builder = ConfigBuilder::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .add_source(Environment::with_prefix("GITVAULT").try_parsing(true));

        builder.build()?.try_deserialize()
    }
}
