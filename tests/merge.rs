use assert_fs::TempDir;
use assert_fs::prelude::*;
use common::command::{
    branch_head, commit_file, init_repository_dir, repository_dir, run_twig_command,
};
use common::file::{FileSpec, write_file};
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::Path;

mod common;

/// The parent lines of a stored commit object
fn commit_parents(dir: &Path, commit_id: &str) -> Vec<String> {
    let object_path = dir
        .join(".twig/objects")
        .join(&commit_id[..2])
        .join(&commit_id[2..]);
    let raw = std::fs::read(&object_path).expect("commit object exists");
    let text = String::from_utf8_lossy(&raw).to_string();

    text.lines()
        .filter_map(|line| line.split_once("parent ").map(|(_, oid)| oid.to_string()))
        .collect()
}

/// first -> second on feat, first -> third on master, both editing a.txt
#[rstest]
fn conflicting_edits_produce_markers_and_a_two_parent_commit(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_twig_command(dir, &["init"]).assert().success();
    commit_file(dir, "a.txt", "x", "first");
    run_twig_command(dir, &["branch", "feat"]).assert().success();

    run_twig_command(dir, &["checkout", "feat"]).assert().success();
    commit_file(dir, "a.txt", "y", "second");
    let feat_head = branch_head(dir, "feat");

    run_twig_command(dir, &["checkout", "master"]).assert().success();
    commit_file(dir, "a.txt", "z", "third");
    let master_head = branch_head(dir, "master");

    run_twig_command(dir, &["merge", "feat"])
        .assert()
        .success()
        .stdout("Encountered a merge conflict.\n");

    repository_dir
        .child("a.txt")
        .assert("<<<<<<< HEAD\nz\n=======\ny>>>>>>>\n");

    let merge_commit = branch_head(dir, "master");
    assert_eq!(commit_parents(dir, &merge_commit), vec![master_head, feat_head]);

    run_twig_command(dir, &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged feat into master."))
        .stdout(predicate::str::contains("Merge: "));
}

#[rstest]
fn merging_an_ancestor_creates_nothing(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "old"]).assert().success();
    commit_file(dir, "new.txt", "new", "moved on");
    let before = branch_head(dir, "master");

    run_twig_command(dir, &["merge", "old"])
        .assert()
        .success()
        .stdout("Given branch is an ancestor of the current branch.\n");

    assert_eq!(branch_head(dir, "master"), before);
}

#[rstest]
fn merging_a_descendant_fast_forwards(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "ahead"]).assert().success();
    run_twig_command(dir, &["checkout", "ahead"]).assert().success();
    commit_file(dir, "ahead.txt", "ahead", "ahead work");
    let ahead = branch_head(dir, "ahead");
    run_twig_command(dir, &["checkout", "master"]).assert().success();

    run_twig_command(dir, &["merge", "ahead"])
        .assert()
        .success()
        .stdout("Current branch fast-forwarded.\n");

    assert_eq!(branch_head(dir, "master"), ahead);
    init_repository_dir.child("ahead.txt").assert("ahead");
}

#[rstest]
fn clean_divergence_merges_both_sides(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_file(dir, "shared.txt", "base", "base");
    commit_file(dir, "doomed.txt", "doomed", "doomed");
    run_twig_command(dir, &["branch", "other"]).assert().success();

    commit_file(dir, "mine.txt", "mine", "master work");

    run_twig_command(dir, &["checkout", "other"]).assert().success();
    commit_file(dir, "shared.txt", "theirs", "edit shared");
    run_twig_command(dir, &["rm", "doomed.txt"]).assert().success();
    run_twig_command(dir, &["commit", "drop doomed"])
        .assert()
        .success();
    commit_file(dir, "theirs.txt", "theirs", "other work");
    run_twig_command(dir, &["checkout", "master"]).assert().success();

    run_twig_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    init_repository_dir.child("mine.txt").assert("mine");
    init_repository_dir.child("theirs.txt").assert("theirs");
    init_repository_dir.child("shared.txt").assert("theirs");
    init_repository_dir
        .child("doomed.txt")
        .assert(predicate::path::missing());
    run_twig_command(dir, &["status"])
        .assert()
        .stdout(predicate::str::contains(
            "=== Staged Files ===\n\n=== Removed Files ===\n\n\
             === Modifications Not Staged For Commit ===\n\n=== Untracked Files ===\n\n",
        ));
}

#[rstest]
fn merge_is_refused_with_staged_changes(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "other"]).assert().success();
    write_file(FileSpec::new(dir.join("pending.txt"), "pending".to_string()));
    run_twig_command(dir, &["add", "pending.txt"]).assert().success();

    run_twig_command(dir, &["merge", "other"])
        .assert()
        .code(1)
        .stdout("You have uncommitted changes.\n");
}

#[rstest]
#[case::missing("nowhere", "A branch with that name does not exist.\n")]
#[case::itself("master", "Cannot merge a branch with itself.\n")]
fn merge_precondition_failures(
    init_repository_dir: TempDir,
    #[case] branch: &str,
    #[case] message: &str,
) {
    run_twig_command(init_repository_dir.path(), &["merge", branch])
        .assert()
        .code(1)
        .stdout(predicate::str::diff(message.to_string()));
}

#[rstest]
fn untracked_file_in_the_way_blocks_merge(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "other"]).assert().success();
    commit_file(dir, "mine.txt", "mine", "master work");
    run_twig_command(dir, &["checkout", "other"]).assert().success();
    commit_file(dir, "clash.txt", "theirs", "other work");
    run_twig_command(dir, &["checkout", "master"]).assert().success();
    let before = branch_head(dir, "master");

    write_file(FileSpec::new(dir.join("clash.txt"), "precious".to_string()));

    run_twig_command(dir, &["merge", "other"])
        .assert()
        .code(1)
        .stdout(
            "There is an untracked file in the way; delete it, or add and commit it first.\n",
        );

    assert_eq!(branch_head(dir, "master"), before);
    init_repository_dir.child("clash.txt").assert("precious");
}
