//! Process exit codes.
//!
//! The values are part of the observable contract; wrapper scripts key off
//! them to distinguish "a repo failed" from "a source is down".

use gitvault::RunStatus;

/// Configuration could not be loaded or is unusable.
pub const CONFIG_FAILED: i32 = 1;
/// One or more repositories failed to sync.
pub const SYNC_FAILED: i32 = 100;
/// A source failed its connectivity test or its repository listing.
pub const SOURCE_FAILED: i32 = 110;
/// No sources are configured.
pub const NO_SOURCES: i32 = 111;

pub fn for_status(status: RunStatus) -> i32 {
    match status {
        RunStatus::Clean => 0,
        RunStatus::RepoFailures => SYNC_FAILED,
        RunStatus::SourceUnreachable | RunStatus::ListingFailed => SOURCE_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_run_exits_zero() {
        assert_eq!(for_status(RunStatus::Clean), 0);
    }

    #[test]
    fn repo_failures_exit_100() {
        assert_eq!(for_status(RunStatus::RepoFailures), 100);
    }

    #[test]
    fn source_level_failures_exit_110() {
        assert_eq!(for_status(RunStatus::SourceUnreachable), 110);
        assert_eq!(for_status(RunStatus::ListingFailed), 110);
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [CONFIG_FAILED, SYNC_FAILED, SOURCE_FAILED, NO_SOURCES];
        for (i, a) in codes.iter().enumerate() {
            for b in codes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
