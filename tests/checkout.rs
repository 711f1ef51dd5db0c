use assert_fs::TempDir;
use assert_fs::prelude::*;
use common::command::{
    branch_head, commit_file, init_repository_dir, run_twig_command,
};
use common::file::{FileSpec, write_file};
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

#[rstest]
fn checkout_of_a_file_restores_the_head_version(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("wug.txt"), "scribbled".to_string()));

    run_twig_command(dir, &["checkout", "--", "wug.txt"])
        .assert()
        .success();

    init_repository_dir.child("wug.txt").assert("This is a wug.");
}

#[rstest]
fn checkout_of_a_file_from_an_abbreviated_commit(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let first = branch_head(dir, "master");
    commit_file(dir, "wug.txt", "version two", "second");

    run_twig_command(dir, &["checkout", &first[..8], "--", "wug.txt"])
        .assert()
        .success();

    init_repository_dir.child("wug.txt").assert("This is a wug.");
    // HEAD and the stage are untouched
    assert!(branch_head(dir, "master") != first);
    run_twig_command(dir, &["status"])
        .assert()
        .stdout(predicate::str::contains("=== Staged Files ===\n\n"));
}

#[rstest]
#[case::unknown_commit(&["checkout", "0123456789", "--", "wug.txt"], "No commit with that id exists.\n")]
#[case::file_not_in_commit(&["checkout", "--", "nope.txt"], "File does not exist in that commit.\n")]
#[case::unknown_branch(&["checkout", "nowhere"], "A branch with that name does not exist.\n")]
#[case::current_branch(&["checkout", "master"], "No need to checkout the current branch.\n")]
fn checkout_failures(init_repository_dir: TempDir, #[case] args: &[&str], #[case] message: &str) {
    run_twig_command(init_repository_dir.path(), args)
        .assert()
        .code(1)
        .stdout(predicate::str::diff(message.to_string()));
}

#[rstest]
fn checkout_of_a_branch_swaps_the_working_tree(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "other"]).assert().success();
    commit_file(dir, "master-only.txt", "m", "master work");
    commit_file(dir, "nested/deep.txt", "d", "nested work");

    run_twig_command(dir, &["checkout", "other"]).assert().success();

    init_repository_dir
        .child("master-only.txt")
        .assert(predicate::path::missing());
    init_repository_dir
        .child("nested")
        .assert(predicate::path::missing());
    init_repository_dir.child("wug.txt").assert("This is a wug.");
    init_repository_dir
        .child(".twig/HEAD")
        .assert("ref: refs/heads/other");

    run_twig_command(dir, &["checkout", "master"]).assert().success();
    init_repository_dir.child("master-only.txt").assert("m");
    init_repository_dir.child("nested/deep.txt").assert("d");
}

#[rstest]
fn checkout_discards_staged_changes(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "other"]).assert().success();
    write_file(FileSpec::new(dir.join("wug.txt"), "staged edit".to_string()));
    run_twig_command(dir, &["add", "wug.txt"]).assert().success();

    run_twig_command(dir, &["checkout", "other"]).assert().success();

    init_repository_dir.child("wug.txt").assert("This is a wug.");
    run_twig_command(dir, &["status"])
        .assert()
        .stdout(predicate::str::contains("=== Staged Files ===\n\n"));
}

#[rstest]
fn untracked_file_in_the_way_blocks_checkout(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "other"]).assert().success();
    run_twig_command(dir, &["checkout", "other"]).assert().success();
    commit_file(dir, "clash.txt", "tracked on other", "other work");
    run_twig_command(dir, &["checkout", "master"]).assert().success();

    write_file(FileSpec::new(dir.join("clash.txt"), "precious".to_string()));

    run_twig_command(dir, &["checkout", "other"])
        .assert()
        .code(1)
        .stdout(
            "There is an untracked file in the way; delete it, or add and commit it first.\n",
        );

    init_repository_dir.child("clash.txt").assert("precious");
    init_repository_dir
        .child(".twig/HEAD")
        .assert("ref: refs/heads/master");
}

#[rstest]
fn untracked_file_where_a_directory_is_needed_blocks_checkout(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "other"]).assert().success();
    run_twig_command(dir, &["checkout", "other"]).assert().success();
    commit_file(dir, "docs/readme.txt", "read me", "docs");
    run_twig_command(dir, &["checkout", "master"]).assert().success();

    write_file(FileSpec::new(dir.join("docs"), "a file, not a directory".to_string()));

    run_twig_command(dir, &["checkout", "other"]).assert().code(1);
    init_repository_dir
        .child("docs")
        .assert("a file, not a directory");
}
