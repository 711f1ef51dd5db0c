use assert_fs::TempDir;
use assert_fs::prelude::*;
use common::command::{branch_head, commit_file, init_repository_dir, run_twig_command};
use common::file::{FileSpec, write_file};
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn reset_restores_the_snapshot_and_moves_the_branch(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let old_commit = branch_head(dir, "master");
    commit_file(dir, "wug.txt", "newer wug", "edited wug");
    commit_file(dir, "later.txt", "later", "added later");
    write_file(FileSpec::new(dir.join("scratch.txt"), "scratch".to_string()));
    run_twig_command(dir, &["add", "scratch.txt"]).assert().success();

    run_twig_command(dir, &["reset", &old_commit])
        .assert()
        .success();

    init_repository_dir.child("wug.txt").assert("This is a wug.");
    init_repository_dir
        .child("later.txt")
        .assert(predicate::path::missing());
    assert_eq!(branch_head(dir, "master"), old_commit);
    init_repository_dir
        .child(".twig/HEAD")
        .assert("ref: refs/heads/master");
    // the stage is cleared, the no longer staged file is left in place
    run_twig_command(dir, &["status"])
        .assert()
        .stdout(predicate::str::contains(
            "=== Staged Files ===\n\n=== Removed Files ===\n\n",
        ))
        .stdout(predicate::str::contains("=== Untracked Files ===\nscratch.txt\n"));
}

#[rstest]
fn reset_accepts_an_abbreviated_id(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let old_commit = branch_head(dir, "master");
    commit_file(dir, "wug.txt", "newer wug", "edited wug");

    run_twig_command(dir, &["reset", &old_commit[..6]])
        .assert()
        .success();

    assert_eq!(branch_head(dir, "master"), old_commit);
}

#[rstest]
fn reset_to_an_unknown_commit_fails(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["reset", "abcdef0123"])
        .assert()
        .code(1)
        .stdout("No commit with that id exists.\n");
}

#[rstest]
fn untracked_file_in_the_way_blocks_reset(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_file(dir, "tracked.txt", "v1", "tracked");
    let with_tracked = branch_head(dir, "master");
    run_twig_command(dir, &["rm", "tracked.txt"]).assert().success();
    run_twig_command(dir, &["commit", "untracked it"])
        .assert()
        .success();
    let without_tracked = branch_head(dir, "master");
    write_file(FileSpec::new(dir.join("tracked.txt"), "mine now".to_string()));

    run_twig_command(dir, &["reset", &with_tracked])
        .assert()
        .code(1)
        .stdout(
            "There is an untracked file in the way; delete it, or add and commit it first.\n",
        );

    assert_eq!(branch_head(dir, "master"), without_tracked);
    init_repository_dir.child("tracked.txt").assert("mine now");
}
