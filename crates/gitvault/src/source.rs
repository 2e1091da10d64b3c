//! Provider-agnostic contract for repository hosting sources.
//!
//! A source knows how to verify its own reachability and enumerate the
//! repositories it should mirror. The orchestrator only ever talks to
//! `dyn RepoSource`, so adding a provider means implementing one trait.

mod errors;
mod types;

pub use errors::{short_error_message, SourceError};
pub use types::{RemoteRepo, RepoSource};

/// Result alias for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
