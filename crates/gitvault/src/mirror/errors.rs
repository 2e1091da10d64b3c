//! Sync engine errors.

use std::path::PathBuf;

use thiserror::Error;

/// Unrecoverable failure while materializing a repository mirror.
///
/// Each variant names the phase of the state machine that failed, with the
/// underlying libgit2 error chained as the source.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("probing remote for {repo} failed: {source}")]
    Probe {
        repo: String,
        #[source]
        source: git2::Error,
    },

    #[error("clone of {repo} failed: {source}")]
    Clone {
        repo: String,
        #[source]
        source: git2::Error,
    },

    #[error("cannot open local repository at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("pull of {repo} failed: {source}")]
    Pull {
        repo: String,
        #[source]
        source: git2::Error,
    },

    #[error("{repo}: local branch has diverged from the remote (not fast-forwardable)")]
    NonFastForward { repo: String },

    #[error("ref fetch for {repo} failed: {source}")]
    Fetch {
        repo: String,
        #[source]
        source: git2::Error,
    },
}
