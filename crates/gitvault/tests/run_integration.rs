//! Orchestrator tests over a stub source and local fixture remotes.

use std::path::Path;

use async_trait::async_trait;
use git2::{Repository, Signature};
use tempfile::TempDir;
use url::Url;

use gitvault::{run, RemoteRepo, RepoSource, RunOptions, RunStatus, SourceError};

struct StubSource {
    repos: Vec<RemoteRepo>,
}

#[async_trait]
impl RepoSource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    async fn test(&self) -> Result<(), SourceError> {
        Ok(())
    }

    async fn list_repositories(&self) -> Result<Vec<RemoteRepo>, SourceError> {
        Ok(self.repos.clone())
    }
}

fn commit_file(repo: &Repository, file: &str, content: &str) {
    let sig = Signature::now("tester", "tester@example.com").expect("signature");
    let blob = repo.blob(content.as_bytes()).expect("blob");
    let mut builder = repo.treebuilder(None).expect("treebuilder");
    builder.insert(file, blob, 0o100644).expect("tree insert");
    let tree_id = builder.write().expect("tree write");
    let tree = repo.find_tree(tree_id).expect("find tree");
    repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .expect("commit");
}

/// A populated bare fixture remote.
fn good_remote(dir: &Path, name: &str) -> RemoteRepo {
    let path = dir.join(format!("{name}.git"));
    let repo = Repository::init_bare(&path).expect("init bare remote");
    commit_file(&repo, "README.md", name);
    RemoteRepo::new(
        Url::from_file_path(&path).expect("file url"),
        format!("fixtures/{name}"),
    )
}

/// A remote with zero commits.
fn empty_remote(dir: &Path, name: &str) -> RemoteRepo {
    let path = dir.join(format!("{name}.git"));
    Repository::init_bare(&path).expect("init bare remote");
    RemoteRepo::new(
        Url::from_file_path(&path).expect("file url"),
        format!("fixtures/{name}"),
    )
}

/// A remote URL that points at nothing.
fn broken_remote(dir: &Path, name: &str) -> RemoteRepo {
    let path = dir.join(format!("{name}-missing.git"));
    RemoteRepo::new(
        Url::from_file_path(&path).expect("file url"),
        format!("fixtures/{name}"),
    )
}

fn options(backup_root: &Path, fail_at_end: bool) -> RunOptions {
    RunOptions {
        backup_root: backup_root.to_path_buf(),
        bare: true,
        fail_at_end,
    }
}

#[tokio::test]
async fn fail_fast_stops_at_the_first_broken_repository() {
    let fixtures = TempDir::new().expect("tempdir");
    let backup = TempDir::new().expect("tempdir");

    let sources: Vec<Box<dyn RepoSource>> = vec![Box::new(StubSource {
        repos: vec![
            good_remote(fixtures.path(), "alpha"),
            broken_remote(fixtures.path(), "beta"),
            good_remote(fixtures.path(), "gamma"),
        ],
    })];

    let report = run(&sources, &options(backup.path(), false)).await;

    assert_eq!(report.status, RunStatus::RepoFailures);
    assert_eq!(report.processed, 1);
    assert_eq!(report.error_count(), 1);
    assert!(report.failed[0].starts_with("fixtures/beta"));

    // The run stopped before gamma: its mirror was never materialized.
    let gamma = backup.path().join("stub/fixtures/gamma");
    assert!(!gamma.join("HEAD").exists());
}

#[tokio::test]
async fn fail_at_end_attempts_every_repository_and_records_failures() {
    let fixtures = TempDir::new().expect("tempdir");
    let backup = TempDir::new().expect("tempdir");

    let sources: Vec<Box<dyn RepoSource>> = vec![Box::new(StubSource {
        repos: vec![
            good_remote(fixtures.path(), "alpha"),
            empty_remote(fixtures.path(), "hollow"),
            broken_remote(fixtures.path(), "beta"),
            good_remote(fixtures.path(), "gamma"),
        ],
    })];

    let report = run(&sources, &options(backup.path(), true)).await;

    assert_eq!(report.status, RunStatus::RepoFailures);
    // Failures are recorded, not counted as processed; the empty remote is
    // a success.
    assert_eq!(report.processed, 3);
    assert_eq!(report.cloned, 2);
    assert_eq!(report.skipped_empty, 1);
    assert_eq!(report.error_count(), 1);
    assert!(report.failed[0].starts_with("fixtures/beta"));

    // gamma was reached despite beta's failure.
    let gamma = backup.path().join("stub/fixtures/gamma");
    assert!(gamma.join("HEAD").exists());
}

#[tokio::test]
async fn clean_run_counts_every_outcome_kind() {
    let fixtures = TempDir::new().expect("tempdir");
    let backup = TempDir::new().expect("tempdir");

    let repos = vec![
        good_remote(fixtures.path(), "alpha"),
        empty_remote(fixtures.path(), "hollow"),
    ];
    let sources: Vec<Box<dyn RepoSource>> = vec![Box::new(StubSource {
        repos: repos.clone(),
    })];

    let first = run(&sources, &options(backup.path(), false)).await;
    assert_eq!(first.status, RunStatus::Clean);
    assert_eq!(first.processed, 2);
    assert_eq!(first.cloned, 1);
    assert_eq!(first.skipped_empty, 1);

    // Running again over unchanged remotes flips the clone to
    // already-current.
    let second = run(&sources, &options(backup.path(), false)).await;
    assert_eq!(second.status, RunStatus::Clean);
    assert_eq!(second.processed, 2);
    assert_eq!(second.already_current, 1);
    assert_eq!(second.skipped_empty, 1);
}

#[tokio::test]
async fn mirrors_are_stored_under_source_and_full_name() {
    let fixtures = TempDir::new().expect("tempdir");
    let backup = TempDir::new().expect("tempdir");

    let sources: Vec<Box<dyn RepoSource>> = vec![Box::new(StubSource {
        repos: vec![good_remote(fixtures.path(), "alpha")],
    })];

    let report = run(&sources, &options(backup.path(), false)).await;
    assert!(report.success());

    let mirror = backup.path().join("stub/fixtures/alpha");
    assert!(mirror.join("HEAD").exists(), "bare mirror expected");
}
