//! GitLab source adapter.
//!
//! Discovers every project the token's user is a member of over the REST v4
//! API. Works against gitlab.com and self-hosted instances alike.

mod client;
mod error;
mod types;

pub use client::{GitLabSource, GITLAB_HOST};
pub use error::GitLabError;
pub use types::{GitLabProject, GitLabUser};
