//! Classification of libgit2 errors into domain terms.

use git2::{ErrorClass, ErrorCode};

/// What a failed libgit2 operation means for the sync state machine.
///
/// The engine branches on these kinds rather than on raw libgit2 codes, so
/// the clone-vs-update decision reads in domain terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureKind {
    /// The remote repository has no commits.
    EmptyRemote,
    /// A repository (or non-empty directory) already occupies the local path.
    LocalExists,
    /// Anything else; surfaced to the caller unchanged.
    Other,
}

pub(crate) fn classify(err: &git2::Error) -> FailureKind {
    match (err.class(), err.code()) {
        (_, ErrorCode::Exists) => FailureKind::LocalExists,
        // An empty remote advertises no HEAD; checkout after clone then has
        // nothing to resolve.
        (_, ErrorCode::UnbornBranch) => FailureKind::EmptyRemote,
        (ErrorClass::Reference, ErrorCode::NotFound) => FailureKind::EmptyRemote,
        _ => FailureKind::Other,
    }
}
