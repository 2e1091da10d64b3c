//! Repository synchronization.
//!
//! `MirrorEngine::materialize` brings one local mirror in line with its
//! remote: a full mirror clone the first time, an incremental ref refresh
//! on every run after that.

mod classify;
mod credentials;
mod engine;
mod errors;

pub use engine::MirrorEngine;
pub use errors::SyncError;

/// Result of materializing one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A fresh mirror clone was created.
    Cloned,
    /// An existing mirror picked up new refs.
    Updated,
    /// The existing mirror already matched the remote.
    AlreadyCurrent,
    /// The remote has no commits; there is nothing to back up.
    SkippedEmpty,
}

impl SyncOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SyncOutcome::Cloned => "cloned",
            SyncOutcome::Updated => "updated",
            SyncOutcome::AlreadyCurrent => "already current",
            SyncOutcome::SkippedEmpty => "skipped (empty remote)",
        }
    }
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
