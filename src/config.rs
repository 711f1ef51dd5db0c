//! Repository configuration
//!
//! A [`RepositoryConfig`] is built once by the caller and handed to
//! [`Repository::new`](crate::areas::repository::Repository::new). Nothing in the
//! crate reads process-wide state on its own, so tests can open any number of
//! independent repositories side by side.
//!
//! ## Environment
//!
//! [`RepositoryConfig::load_from_env`] reads:
//!
//! - `TWIG_AUTHOR_NAME`, `TWIG_AUTHOR_EMAIL` (required to commit)
//! - `TWIG_AUTHOR_DATE` (optional, RFC 2822 or `%Y-%m-%d %H:%M:%S %z`)
//! - `TWIG_MERGE_BASE` (optional, `lockstep` or `best`)

use crate::artifacts::merge::split_point::SplitPointStrategy;
use crate::artifacts::objects::commit::Author;
use anyhow::Context;
use derive_new::new;
use std::path::{Path, PathBuf};

/// Name of the metadata directory inside the working tree
pub const TWIG_DIR: &str = ".twig";

/// Branch created by `init`
pub const DEFAULT_BRANCH: &str = "master";

#[derive(Debug, Clone, new)]
pub struct RepositoryConfig {
    /// Root of the working tree
    root: PathBuf,
    /// Identity recorded on new commits
    author: AuthorSource,
    /// How `merge` picks the split point
    #[new(default)]
    split_point_strategy: SplitPointStrategy,
}

/// Where commit authorship comes from
#[derive(Debug, Clone)]
pub enum AuthorSource {
    /// A fixed identity and timestamp, for reproducible histories
    Fixed(Author),
    /// A fixed identity stamped with the current time on every commit
    Named { name: String, email: String },
    /// The `TWIG_AUTHOR_*` variables, read when a commit is made
    Env,
}

impl AuthorSource {
    pub fn author(&self) -> anyhow::Result<Author> {
        match self {
            AuthorSource::Fixed(author) => Ok(author.clone()),
            AuthorSource::Named { name, email } => Ok(Author::new(name.clone(), email.clone())),
            AuthorSource::Env => Self::author_from_env(),
        }
    }

    fn author_from_env() -> anyhow::Result<Author> {
        let name = std::env::var("TWIG_AUTHOR_NAME").context("TWIG_AUTHOR_NAME not set")?;
        let email = std::env::var("TWIG_AUTHOR_EMAIL").context("TWIG_AUTHOR_EMAIL not set")?;

        match std::env::var("TWIG_AUTHOR_DATE").ok() {
            Some(date) => Ok(Author::new_with_timestamp(
                name,
                email,
                Author::parse_date(&date)?,
            )),
            None => Ok(Author::new(name, email)),
        }
    }
}

impl RepositoryConfig {
    /// Build a configuration for `root` from the `TWIG_*` environment variables
    ///
    /// Authorship is only read from the environment when a commit is made,
    /// so read-only commands work without it.
    pub fn load_from_env(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let strategy = match std::env::var("TWIG_MERGE_BASE").ok() {
            Some(value) => value.parse()?,
            None => SplitPointStrategy::default(),
        };

        Ok(Self::new(root.into(), AuthorSource::Env).with_split_point_strategy(strategy))
    }

    pub fn with_split_point_strategy(mut self, strategy: SplitPointStrategy) -> Self {
        self.split_point_strategy = strategy;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn twig_dir(&self) -> PathBuf {
        self.root.join(TWIG_DIR)
    }

    pub fn author(&self) -> anyhow::Result<Author> {
        self.author.author()
    }

    pub fn split_point_strategy(&self) -> SplitPointStrategy {
        self.split_point_strategy
    }
}
