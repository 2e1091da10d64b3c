//! The sync engine state machine.
//!
//! `materialize` drives one repository through: probe the remote, mirror
//! clone if nothing exists locally, otherwise refresh the existing mirror
//! (fast-forward pull of the checked-out branch for worktree clones, then
//! forced branch and tag fetches for everything).

use std::cell::Cell;
use std::path::Path;

use git2::build::RepoBuilder;
use git2::{AutotagOption, Direction, FetchOptions, Remote, RemoteCallbacks, Repository};

use crate::mem::MemoryGauge;
use crate::source::RemoteRepo;

use super::classify::{classify, FailureKind};
use super::credentials::UrlCredentials;
use super::errors::SyncError;
use super::SyncOutcome;

/// Refspec installed on mirror clones: every remote ref maps onto the same
/// local name, forced so history rewrites are mirrored too.
const MIRROR_REFSPEC: &str = "+refs/*:refs/*";
const BRANCH_REFSPEC: &str = "+refs/heads/*:refs/heads/*";
const TAG_REFSPEC: &str = "+refs/tags/*:refs/tags/*";

/// Synchronizes local mirrors with their remotes, one repository at a time.
pub struct MirrorEngine {
    gauge: MemoryGauge,
}

impl MirrorEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            gauge: MemoryGauge::new(),
        }
    }

    /// Ensure the repository at `local_path` mirrors `remote`.
    ///
    /// Synchronous; callers on an async runtime should wrap this in a
    /// blocking task. Never deletes local data: a failed sync leaves
    /// whatever state the previous successful run produced.
    pub fn materialize(
        &self,
        remote: &RemoteRepo,
        local_path: &Path,
        bare: bool,
    ) -> Result<SyncOutcome, SyncError> {
        let creds = UrlCredentials::from_url(&remote.clone_url);

        if self.remote_is_empty(remote, &creds)? {
            tracing::info!(repo = %remote.full_name, "remote is empty, nothing to back up");
            return Ok(SyncOutcome::SkippedEmpty);
        }

        self.gauge.sample("before clone", &remote.full_name);
        match self.clone_mirror(remote, &creds, local_path, bare) {
            Ok(()) => {
                self.gauge.sample("after clone", &remote.full_name);
                tracing::info!(
                    repo = %remote.full_name,
                    path = %local_path.display(),
                    bare,
                    "cloned repository"
                );
                Ok(SyncOutcome::Cloned)
            }
            Err(err) => match classify(&err) {
                FailureKind::LocalExists => self.refresh_existing(remote, &creds, local_path),
                // Backstop; the probe normally catches this first.
                FailureKind::EmptyRemote => Ok(SyncOutcome::SkippedEmpty),
                FailureKind::Other => Err(SyncError::Clone {
                    repo: remote.full_name.clone(),
                    source: err,
                }),
            },
        }
    }

    /// Probe the remote's ref advertisement. Zero advertised refs is the
    /// empty-repository signal.
    fn remote_is_empty(
        &self,
        remote: &RemoteRepo,
        creds: &UrlCredentials,
    ) -> Result<bool, SyncError> {
        let probe_err = |source| SyncError::Probe {
            repo: remote.full_name.clone(),
            source,
        };

        let mut probe = Remote::create_detached(remote.clone_url.as_str()).map_err(probe_err)?;

        let attempted = Cell::new(false);
        let mut callbacks = RemoteCallbacks::new();
        creds.install(&mut callbacks, &attempted);

        let connection = probe
            .connect_auth(Direction::Fetch, Some(callbacks), None)
            .map_err(probe_err)?;
        let heads = connection.list().map_err(probe_err)?;
        Ok(heads.is_empty())
    }

    fn clone_mirror(
        &self,
        remote: &RemoteRepo,
        creds: &UrlCredentials,
        local_path: &Path,
        bare: bool,
    ) -> Result<(), git2::Error> {
        let attempted = Cell::new(false);
        let mut callbacks = RemoteCallbacks::new();
        creds.install(&mut callbacks, &attempted);

        let mut options = FetchOptions::new();
        options.remote_callbacks(callbacks);
        options.download_tags(AutotagOption::All);

        let mut builder = RepoBuilder::new();
        builder.bare(bare);
        builder.fetch_options(options);
        builder.remote_create(|repo, name, url| repo.remote_with_fetch(name, url, MIRROR_REFSPEC));

        builder.clone(remote.clone_url.as_str(), local_path).map(|_| ())
    }

    /// The local path already holds a repository: refresh it.
    fn refresh_existing(
        &self,
        remote: &RemoteRepo,
        creds: &UrlCredentials,
        local_path: &Path,
    ) -> Result<SyncOutcome, SyncError> {
        let repo = Repository::open(local_path).map_err(|e| SyncError::Open {
            path: local_path.to_path_buf(),
            source: e,
        })?;

        let mut pulled = false;
        if !repo.is_bare() {
            // A pull only advances the checked-out branch; every other ref
            // is handled by the fetch phases below.
            pulled = self.pull_current_branch(&repo, remote, creds)?;
        }

        let updated_tips = self.fetch_all_refs(&repo, remote, creds)?;
        if pulled || updated_tips > 0 {
            tracing::info!(repo = %remote.full_name, updated_tips, "updated repository");
            Ok(SyncOutcome::Updated)
        } else {
            tracing::info!(repo = %remote.full_name, "repository already up to date");
            Ok(SyncOutcome::AlreadyCurrent)
        }
    }

    /// Fast-forward the checked-out branch to the remote's tip.
    ///
    /// Returns whether the branch actually moved. Up to date is not an
    /// error. A branch that cannot fast-forward means the local mirror was
    /// modified by hand; refusing beats silently discarding that work.
    fn pull_current_branch(
        &self,
        repo: &Repository,
        remote: &RemoteRepo,
        creds: &UrlCredentials,
    ) -> Result<bool, SyncError> {
        let pull_err = |source| SyncError::Pull {
            repo: remote.full_name.clone(),
            source,
        };

        let head = repo.head().map_err(pull_err)?;
        let branch = match head.shorthand() {
            Ok(name) => name.to_string(),
            Err(_) => return Ok(false),
        };

        {
            let mut handle = self.remote_handle(repo, remote)?;
            let attempted = Cell::new(false);
            let mut callbacks = RemoteCallbacks::new();
            creds.install(&mut callbacks, &attempted);
            let mut options = FetchOptions::new();
            options.remote_callbacks(callbacks);
            handle
                .fetch(&[branch.as_str()], Some(&mut options), None)
                .map_err(pull_err)?;
        }

        let fetch_head = repo.find_reference("FETCH_HEAD").map_err(pull_err)?;
        let fetched = repo
            .reference_to_annotated_commit(&fetch_head)
            .map_err(pull_err)?;
        let (analysis, _) = repo.merge_analysis(&[&fetched]).map_err(pull_err)?;

        if analysis.is_up_to_date() {
            tracing::debug!(repo = %remote.full_name, branch, "checked-out branch up to date");
            Ok(false)
        } else if analysis.is_fast_forward() {
            let refname = format!("refs/heads/{branch}");
            let mut reference = repo.find_reference(&refname).map_err(pull_err)?;
            reference
                .set_target(fetched.id(), "fast-forward")
                .map_err(pull_err)?;
            repo.set_head(&refname).map_err(pull_err)?;
            repo.checkout_head(Some(git2::build::CheckoutBuilder::default().force()))
                .map_err(pull_err)?;
            tracing::debug!(repo = %remote.full_name, branch, "fast-forwarded checked-out branch");
            Ok(true)
        } else {
            Err(SyncError::NonFastForward {
                repo: remote.full_name.clone(),
            })
        }
    }

    /// Fetch branches, then tags, as separate forced operations.
    ///
    /// Branch-fetch failure does not abort the tag fetch; the namespaces are
    /// independent and a partial failure on one should not prevent
    /// recovering the other. Returns the number of refs that actually moved.
    fn fetch_all_refs(
        &self,
        repo: &Repository,
        remote: &RemoteRepo,
        creds: &UrlCredentials,
    ) -> Result<usize, SyncError> {
        let name = &remote.full_name;
        tracing::info!(repo = %name, "fetching all branches and tags");
        self.gauge.sample("before branch fetch", name);

        let mut updated_tips = 0usize;
        match self.fetch_phase(repo, remote, creds, &[BRANCH_REFSPEC], AutotagOption::None) {
            Ok(tips) => updated_tips += tips,
            Err(err) => {
                tracing::warn!(repo = %name, error = %err, "branch fetch failed, fetching tags anyway");
            }
        }

        self.gauge.sample("after branch fetch", name);
        self.gauge.reclaim_hint("between fetch phases", name);

        // Auto-tag download wants the remote's configured refspecs; a
        // stale directory may carry an origin that lacks them, so fall back
        // to the explicit refspec when the first form fails.
        let has_origin = repo.find_remote("origin").is_ok();
        let primary: (&[&str], AutotagOption) = if has_origin {
            (&[], AutotagOption::All)
        } else {
            (&[TAG_REFSPEC], AutotagOption::None)
        };

        let tag_tips = match self.fetch_phase(repo, remote, creds, primary.0, primary.1) {
            Ok(tips) => tips,
            Err(err) => {
                tracing::warn!(repo = %name, error = %err, "tag fetch failed, retrying with explicit refspec");
                self.fetch_phase(repo, remote, creds, &[TAG_REFSPEC], AutotagOption::None)
                    .map_err(|e| SyncError::Fetch {
                        repo: name.clone(),
                        source: e,
                    })?
            }
        };
        updated_tips += tag_tips;

        self.gauge.sample("after tag fetch", name);
        self.gauge.reclaim_hint("after fetch", name);
        Ok(updated_tips)
    }

    /// One fetch against the remote, counting moved refs.
    ///
    /// Callbacks and options are scoped to the phase so libgit2's object
    /// graph is released before the next one starts.
    fn fetch_phase(
        &self,
        repo: &Repository,
        remote: &RemoteRepo,
        creds: &UrlCredentials,
        refspecs: &[&str],
        tags: AutotagOption,
    ) -> Result<usize, git2::Error> {
        let mut handle = match repo.find_remote("origin") {
            Ok(origin) => origin,
            Err(_) => repo.remote_anonymous(remote.clone_url.as_str())?,
        };

        let attempted = Cell::new(false);
        let updated = Cell::new(0usize);
        let mut callbacks = RemoteCallbacks::new();
        creds.install(&mut callbacks, &attempted);
        callbacks.update_tips(|refname, _old, _new| {
            updated.set(updated.get() + 1);
            tracing::trace!(refname, "ref updated");
            true
        });

        let mut options = FetchOptions::new();
        options.remote_callbacks(callbacks);
        options.download_tags(tags);

        handle.fetch(refspecs, Some(&mut options), None)?;
        Ok(updated.get())
    }

    /// Prefer the configured `origin` remote (what our own clones create);
    /// a stale directory without one is fetched anonymously against the
    /// discovered URL.
    fn remote_handle<'r>(
        &self,
        repo: &'r Repository,
        remote: &RemoteRepo,
    ) -> Result<Remote<'r>, SyncError> {
        match repo.find_remote("origin") {
            Ok(origin) => Ok(origin),
            Err(_) => repo
                .remote_anonymous(remote.clone_url.as_str())
                .map_err(|e| SyncError::Fetch {
                    repo: remote.full_name.clone(),
                    source: e,
                }),
        }
    }
}

impl Default for MirrorEngine {
    fn default() -> Self {
        Self::new()
    }
}
