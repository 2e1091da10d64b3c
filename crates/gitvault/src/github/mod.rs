//! GitHub source adapter.
//!
//! Discovers the authenticated user's repositories (plus any configured
//! organizations) over the REST API and produces clone URLs with the token
//! embedded, so the sync engine can authenticate the git transport.

mod client;
mod error;
mod types;

pub use client::{GitHubSource, GITHUB_API_HOST};
pub use error::GitHubError;
pub use types::{GitHubRepo, GitHubUser};
