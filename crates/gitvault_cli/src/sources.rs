//! Construct source adapters from configuration.

use std::sync::Arc;

use gitvault::github::GitHubSource;
use gitvault::gitlab::GitLabSource;
use gitvault::http::HttpTransport;
use gitvault::RepoSource;

use crate::config::SourceConfig;

/// Build one adapter per configured source, preserving order.
pub fn build(
    configs: &[SourceConfig],
    transport: Arc<dyn HttpTransport>,
) -> Vec<Box<dyn RepoSource>> {
    configs
        .iter()
        .map(|config| match config {
            SourceConfig::Github(github) => {
                let name = github.name.as_deref().unwrap_or("github");
                let mut source =
                    GitHubSource::new(name, &github.token, Arc::clone(&transport))
                        .with_orgs(github.orgs.clone());
                if let Some(api_host) = &github.api_host {
                    source = source.with_api_host(api_host);
                }
                Box::new(source) as Box<dyn RepoSource>
            }
            SourceConfig::Gitlab(gitlab) => {
                let name = gitlab.name.as_deref().unwrap_or("gitlab");
                let mut source = GitLabSource::new(name, &gitlab.token, Arc::clone(&transport));
                if let Some(host) = &gitlab.host {
                    source = source.with_host(host);
                }
                Box::new(source) as Box<dyn RepoSource>
            }
        })
        .collect()
}
