//! Run orchestration.
//!
//! One run walks every configured source in order, lists its repositories,
//! and materializes each mirror sequentially. The accumulated `RunReport`
//! is what the CLI maps to an exit code and what the notifier sends out.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::mirror::{MirrorEngine, SyncOutcome};
use crate::source::{short_error_message, RepoSource};

/// How the run ended; drives the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every repository synced successfully.
    Clean,
    /// One or more repositories failed to sync.
    RepoFailures,
    /// A source failed its connectivity test; the run stopped there.
    SourceUnreachable,
    /// A source failed to list its repositories; the run stopped there.
    ListingFailed,
}

/// Options for one backup run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Root directory mirrors are stored under.
    pub backup_root: PathBuf,
    /// Clone without working trees.
    pub bare: bool,
    /// Record per-repository failures and continue instead of stopping at
    /// the first one.
    pub fail_at_end: bool,
}

/// Aggregated result of one run.
///
/// Finalized exactly once, when `run` returns; `processed` counts
/// successful outcomes only (skipped-empty included), failures are listed
/// by repository with a short reason.
#[derive(Debug)]
pub struct RunReport {
    pub processed: usize,
    pub cloned: usize,
    pub updated: usize,
    pub already_current: usize,
    pub skipped_empty: usize,
    pub failed: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
}

impl RunReport {
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.failed.len()
    }

    #[must_use]
    pub fn success(&self) -> bool {
        matches!(self.status, RunStatus::Clean)
    }

    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[derive(Default)]
struct Tally {
    cloned: usize,
    updated: usize,
    already_current: usize,
    skipped_empty: usize,
    failed: Vec<String>,
}

impl Tally {
    fn record(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Cloned => self.cloned += 1,
            SyncOutcome::Updated => self.updated += 1,
            SyncOutcome::AlreadyCurrent => self.already_current += 1,
            SyncOutcome::SkippedEmpty => self.skipped_empty += 1,
        }
    }

    fn processed(&self) -> usize {
        self.cloned + self.updated + self.already_current + self.skipped_empty
    }
}

/// Execute one backup run over `sources`.
///
/// Sources are processed strictly in order; a source that fails its
/// connectivity test or its listing stops the run. Repository failures
/// honor `fail_at_end`.
pub async fn run(sources: &[Box<dyn RepoSource>], options: &RunOptions) -> RunReport {
    let started_at = Utc::now();
    let mut tally = Tally::default();
    let mut status = RunStatus::Clean;
    let engine = Arc::new(MirrorEngine::new());

    'sources: for source in sources {
        let source_name = source.name().to_string();
        tracing::info!(source = %source_name, "processing source");

        if let Err(err) = source.test().await {
            tracing::error!(source = %source_name, error = %err, "source is unreachable");
            tally.failed.push(format!("{source_name} ({err})"));
            status = RunStatus::SourceUnreachable;
            break;
        }

        let repos = match source.list_repositories().await {
            Ok(repos) => repos,
            Err(err) => {
                tracing::error!(source = %source_name, error = %err, "listing repositories failed");
                tally.failed.push(format!("{source_name} ({err})"));
                status = RunStatus::ListingFailed;
                break;
            }
        };
        tracing::info!(source = %source_name, count = repos.len(), "discovered repositories");

        for repo in repos {
            tracing::info!(
                repo = %repo.full_name,
                url = %repo.display_url(),
                "syncing repository"
            );

            let target = options.backup_root.join(&source_name).join(&repo.full_name);
            if let Err(err) = std::fs::create_dir_all(&target) {
                tracing::error!(repo = %repo.full_name, error = %err, "cannot create target directory");
                tally
                    .failed
                    .push(format!("{} (directory creation failed: {err})", repo.full_name));
                if !options.fail_at_end {
                    status = RunStatus::RepoFailures;
                    break 'sources;
                }
                // The path may be partial; skip the sync for this repo.
                continue;
            }

            let task_engine = Arc::clone(&engine);
            let task_repo = repo.clone();
            let bare = options.bare;
            let result = tokio::task::spawn_blocking(move || {
                task_engine.materialize(&task_repo, &target, bare)
            })
            .await;

            match result {
                Ok(Ok(outcome)) => {
                    tracing::info!(repo = %repo.full_name, %outcome, "repository synced");
                    tally.record(outcome);
                }
                Ok(Err(err)) => {
                    tracing::error!(repo = %repo.full_name, error = %err, "sync failed");
                    tally
                        .failed
                        .push(format!("{} ({})", repo.full_name, short_error_message(&err)));
                    if !options.fail_at_end {
                        status = RunStatus::RepoFailures;
                        break 'sources;
                    }
                }
                Err(join_err) => {
                    tracing::error!(repo = %repo.full_name, error = %join_err, "sync task failed");
                    tally
                        .failed
                        .push(format!("{} (sync task failed)", repo.full_name));
                    if !options.fail_at_end {
                        status = RunStatus::RepoFailures;
                        break 'sources;
                    }
                }
            }
        }
    }

    if status == RunStatus::Clean && !tally.failed.is_empty() {
        status = RunStatus::RepoFailures;
    }

    let report = RunReport {
        processed: tally.processed(),
        cloned: tally.cloned,
        updated: tally.updated,
        already_current: tally.already_current,
        skipped_empty: tally.skipped_empty,
        failed: tally.failed,
        started_at,
        finished_at: Utc::now(),
        status,
    };

    tracing::info!(
        processed = report.processed,
        cloned = report.cloned,
        updated = report.updated,
        already_current = report.already_current,
        skipped_empty = report.skipped_empty,
        errors = report.error_count(),
        "run finished"
    );

    report
}
