use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const AUTHOR_NAME: &str = "fake_user";
pub const AUTHOR_EMAIL: &str = "fake_email@email.com";
pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000"; // %Y-%m-%d %H:%M:%S %z

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository with `wug.txt` committed on `master`
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("wug.txt"),
        "This is a wug.".to_string(),
    ));
    run_twig_command(repository_dir.path(), &["add", "wug.txt"])
        .assert()
        .success();
    twig_commit(repository_dir.path(), "added wug")
        .assert()
        .success();

    repository_dir
}

pub fn run_twig_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("twig").expect("Failed to find twig binary");
    cmd.current_dir(dir)
        .args(args)
        .env_remove("TWIG_MERGE_BASE")
        .env_remove("TWIG_LOG")
        .envs(vec![
            ("TWIG_AUTHOR_NAME", AUTHOR_NAME),
            ("TWIG_AUTHOR_EMAIL", AUTHOR_EMAIL),
            ("TWIG_AUTHOR_DATE", AUTHOR_DATE),
        ]);
    cmd
}

pub fn twig_commit(dir: &Path, message: &str) -> Command {
    run_twig_command(dir, &["commit", message])
}

/// Commit with an explicit author date
pub fn twig_commit_at(dir: &Path, message: &str, date: &str) -> Command {
    let mut cmd = twig_commit(dir, message);
    cmd.env("TWIG_AUTHOR_DATE", date);
    cmd
}

/// Write `content` to `file`, stage it and commit it
pub fn commit_file(dir: &Path, file: &str, content: &str, message: &str) {
    write_file(FileSpec::new(dir.join(file), content.to_string()));
    run_twig_command(dir, &["add", file]).assert().success();
    twig_commit(dir, message).assert().success();
}

/// The commit ID a branch points to
pub fn branch_head(dir: &Path, branch: &str) -> String {
    let ref_path = dir.join(".twig").join("refs").join("heads").join(branch);
    std::fs::read_to_string(&ref_path)
        .unwrap_or_else(|e| panic!("Failed to read ref {:?}: {}", ref_path, e))
        .trim()
        .to_string()
}

/// The commit ID HEAD resolves to
pub fn head_commit_id(dir: &Path) -> String {
    let head = std::fs::read_to_string(dir.join(".twig").join("HEAD"))
        .expect("Failed to read HEAD");
    let branch = head
        .trim()
        .strip_prefix("ref: refs/heads/")
        .expect("HEAD is a symbolic ref");

    branch_head(dir, branch)
}
