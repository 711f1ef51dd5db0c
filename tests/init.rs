use assert_fs::TempDir;
use assert_fs::prelude::*;
use common::command::{repository_dir, run_twig_command};
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

#[rstest]
fn init_creates_the_metadata_layout(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    repository_dir
        .child(".twig/HEAD")
        .assert("ref: refs/heads/master");
    repository_dir
        .child(".twig/objects")
        .assert(predicate::path::is_dir());
    repository_dir
        .child(".twig/refs/heads")
        .assert(predicate::path::is_dir());
    // master stays unborn until the first commit
    repository_dir
        .child(".twig/refs/heads/master")
        .assert(predicate::path::missing());

    Ok(())
}

#[rstest]
fn init_at_a_path_creates_the_directory(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init", "nested/project"])
        .assert()
        .success();

    repository_dir
        .child("nested/project/.twig/HEAD")
        .assert(predicate::path::is_file());
}

#[rstest]
fn init_twice_is_refused(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .code(1)
        .stdout(
            "A twig version-control system already exists in the current directory.\n",
        );
}

#[rstest]
#[case::status(&["status"])]
#[case::log(&["log"])]
#[case::add(&["add", "a.txt"])]
#[case::branch(&["branch", "topic"])]
fn commands_outside_a_repository_fail(repository_dir: TempDir, #[case] args: &[&str]) {
    run_twig_command(repository_dir.path(), args)
        .assert()
        .code(1)
        .stdout("Not in an initialized twig directory.\n");
}
