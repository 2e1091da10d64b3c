//! Sync engine tests against local fixture remotes.
//!
//! Fixtures are bare repositories in tempdirs addressed via `file://` URLs,
//! so no network or credentials are involved.

use std::collections::BTreeSet;
use std::path::Path;

use git2::{Repository, Signature};
use tempfile::TempDir;
use url::Url;

use gitvault::{MirrorEngine, RemoteRepo, SyncError, SyncOutcome};

fn signature() -> Signature<'static> {
    Signature::now("tester", "tester@example.com").expect("signature")
}

/// Add or update a file and commit it on HEAD's branch.
fn commit_file(repo: &Repository, file: &str, content: &str, message: &str) -> git2::Oid {
    let sig = signature();
    let blob = repo.blob(content.as_bytes()).expect("blob");

    let base_tree = repo.head().ok().and_then(|h| h.peel_to_tree().ok());
    let mut builder = repo.treebuilder(base_tree.as_ref()).expect("treebuilder");
    builder.insert(file, blob, 0o100644).expect("tree insert");
    let tree_id = builder.write().expect("tree write");
    let tree = repo.find_tree(tree_id).expect("find tree");

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("commit")
}

/// Bare fixture remote plus the RemoteRepo pointing at it.
fn fixture_remote(dir: &Path, name: &str) -> (Repository, RemoteRepo) {
    let path = dir.join(format!("{name}.git"));
    let repo = Repository::init_bare(&path).expect("init bare remote");
    let url = Url::from_file_path(&path).expect("file url");
    let remote = RemoteRepo::new(url, format!("fixtures/{name}"));
    (repo, remote)
}

/// Branch and tag names of a repository, for comparing mirrors.
fn ref_names(repo: &Repository) -> BTreeSet<String> {
    repo.references()
        .expect("references")
        .filter_map(|r| r.ok())
        .filter_map(|r| r.name().ok().map(str::to_string))
        .filter(|name| name.starts_with("refs/heads/") || name.starts_with("refs/tags/"))
        .collect()
}

#[test]
fn empty_remote_is_skipped_without_touching_disk() {
    let dir = TempDir::new().expect("tempdir");
    let (_remote_repo, remote) = fixture_remote(dir.path(), "empty");
    let target = dir.path().join("mirror");

    let outcome = MirrorEngine::new()
        .materialize(&remote, &target, true)
        .expect("empty remote is not an error");

    assert_eq!(outcome, SyncOutcome::SkippedEmpty);
    assert!(!target.exists(), "no mirror should be created");
}

#[test]
fn fresh_clone_mirrors_every_branch_and_tag() {
    let dir = TempDir::new().expect("tempdir");
    let (remote_repo, remote) = fixture_remote(dir.path(), "sample");

    let first = commit_file(&remote_repo, "README.md", "hello", "initial");
    let commit = remote_repo.find_commit(first).expect("find commit");
    remote_repo.branch("dev", &commit, false).expect("branch");
    remote_repo
        .tag_lightweight("v1.0", commit.as_object(), false)
        .expect("tag");

    let target = dir.path().join("mirror");
    let outcome = MirrorEngine::new()
        .materialize(&remote, &target, true)
        .expect("clone should succeed");

    assert_eq!(outcome, SyncOutcome::Cloned);
    let mirror = Repository::open_bare(&target).expect("open mirror");
    assert_eq!(ref_names(&mirror), ref_names(&remote_repo));
}

#[test]
fn second_materialize_of_unchanged_remote_is_already_current() {
    let dir = TempDir::new().expect("tempdir");
    let (remote_repo, remote) = fixture_remote(dir.path(), "stable");
    commit_file(&remote_repo, "file.txt", "v1", "initial");

    let target = dir.path().join("mirror");
    let engine = MirrorEngine::new();

    let first = engine
        .materialize(&remote, &target, true)
        .expect("first sync");
    let second = engine
        .materialize(&remote, &target, true)
        .expect("second sync");

    assert_eq!(first, SyncOutcome::Cloned);
    assert_eq!(second, SyncOutcome::AlreadyCurrent);
}

#[test]
fn remote_changes_are_fetched_into_existing_mirror() {
    let dir = TempDir::new().expect("tempdir");
    let (remote_repo, remote) = fixture_remote(dir.path(), "moving");
    commit_file(&remote_repo, "file.txt", "v1", "initial");

    let target = dir.path().join("mirror");
    let engine = MirrorEngine::new();
    engine
        .materialize(&remote, &target, true)
        .expect("initial clone");

    // Advance the remote: new commit, new branch, new tag.
    let second = commit_file(&remote_repo, "file.txt", "v2", "update");
    let commit = remote_repo.find_commit(second).expect("find commit");
    remote_repo
        .branch("feature", &commit, false)
        .expect("branch");
    remote_repo
        .tag_lightweight("v2.0", commit.as_object(), false)
        .expect("tag");

    let outcome = engine
        .materialize(&remote, &target, true)
        .expect("refresh should succeed");

    assert_eq!(outcome, SyncOutcome::Updated);
    let mirror = Repository::open_bare(&target).expect("open mirror");
    assert_eq!(ref_names(&mirror), ref_names(&remote_repo));
}

#[test]
fn worktree_mirror_fast_forwards_the_checked_out_branch() {
    let dir = TempDir::new().expect("tempdir");
    let (remote_repo, remote) = fixture_remote(dir.path(), "worktree");
    commit_file(&remote_repo, "notes.txt", "first", "initial");

    let target = dir.path().join("mirror");
    let engine = MirrorEngine::new();
    let first = engine
        .materialize(&remote, &target, false)
        .expect("worktree clone");
    assert_eq!(first, SyncOutcome::Cloned);
    assert_eq!(
        std::fs::read_to_string(target.join("notes.txt")).expect("checked-out file"),
        "first"
    );

    commit_file(&remote_repo, "notes.txt", "second", "update");
    let outcome = engine
        .materialize(&remote, &target, false)
        .expect("refresh should succeed");

    assert_eq!(outcome, SyncOutcome::Updated);
    assert_eq!(
        std::fs::read_to_string(target.join("notes.txt")).expect("checked-out file"),
        "second"
    );
}

#[test]
fn directory_that_is_not_a_repository_fails_to_open() {
    let dir = TempDir::new().expect("tempdir");
    let (remote_repo, remote) = fixture_remote(dir.path(), "occupied");
    commit_file(&remote_repo, "file.txt", "v1", "initial");

    // Occupy the target with something that is not a git repository.
    let target = dir.path().join("mirror");
    std::fs::create_dir_all(&target).expect("create target");
    std::fs::write(target.join("leftover.txt"), "junk").expect("write leftover");

    let err = MirrorEngine::new()
        .materialize(&remote, &target, true)
        .expect_err("non-repository directory should fail");

    assert!(matches!(err, SyncError::Open { .. }), "got: {err}");
}

#[test]
fn unreachable_remote_fails_the_probe() {
    let dir = TempDir::new().expect("tempdir");
    let url = Url::from_file_path(dir.path().join("does-not-exist.git")).expect("file url");
    let remote = RemoteRepo::new(url, "fixtures/missing");
    let target = dir.path().join("mirror");

    let err = MirrorEngine::new()
        .materialize(&remote, &target, true)
        .expect_err("missing remote should fail");

    assert!(matches!(err, SyncError::Probe { .. }), "got: {err}");
}
