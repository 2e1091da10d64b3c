//! GitLab API data types.

use serde::Deserialize;

/// GitLab project - fields we need from the API response.
///
/// We define only the fields we need, which makes the code resilient to
/// API changes.
///
/// API docs: https://docs.gitlab.com/ee/api/projects.html#list-all-projects
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabProject {
    /// Full path including namespace (e.g., "group/project").
    pub path_with_namespace: String,
    /// HTTP clone URL.
    pub http_url_to_repo: String,
}

/// GitLab user (authenticated user endpoint response).
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabUser {
    /// Username.
    pub username: String,
}
