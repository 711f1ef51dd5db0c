use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;
use twig::areas::repository::Repository;
use twig::artifacts::objects::commit::Author;
use twig::config::{AuthorSource, RepositoryConfig};

pub fn fixed_author() -> Author {
    Author::new_with_timestamp(
        "fake_user".to_string(),
        "fake_email@email.com".to_string(),
        Author::parse_date("2023-01-01 12:00:00 +0000").expect("valid date"),
    )
}

pub fn open_repository(dir: &Path) -> Repository {
    Repository::new(RepositoryConfig::new(
        dir.to_path_buf(),
        AuthorSource::Fixed(fixed_author()),
    ))
}

/// An initialized repository with no commits
#[fixture]
pub fn repository() -> (TempDir, Repository) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let repository = open_repository(dir.path());
    repository.init().expect("Failed to initialize repository");

    (dir, repository)
}
