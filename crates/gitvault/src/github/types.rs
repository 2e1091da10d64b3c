//! GitHub API data types.

use serde::Deserialize;

/// GitHub repository - fields we need from the API response.
///
/// We define only the fields we need, which makes the code resilient to
/// API changes.
///
/// API docs: https://docs.github.com/en/rest/repos/repos#list-repositories-for-the-authenticated-user
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    /// Full name including owner (e.g., "owner/repo").
    pub full_name: String,
    /// HTTP clone URL.
    pub clone_url: String,
}

/// GitHub user (authenticated user endpoint response).
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    /// Username/login.
    pub login: String,
}
