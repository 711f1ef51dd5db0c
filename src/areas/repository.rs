//! The repository handle
//!
//! A [`Repository`] owns one instance of each area (object database, working
//! tree, refs) and knows where the stage lives. Commands are implemented as
//! `impl Repository` blocks under [`crate::commands::porcelain`].
//!
//! ## Locking
//!
//! Commands that change repository state hold [`Repository::lock`] for their
//! whole duration. Read-only commands do not.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::{Commit, SlimCommit, TrackedFiles};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::status::inspector::Inspector;
use crate::config::{RepositoryConfig, TWIG_DIR};
use crate::error::RepositoryError;
use anyhow::Context;
use file_guard::{FileGuard, Lock};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Component, Path, PathBuf};

const LOCK_FILE: &str = "lock";
const INDEX_FILE: &str = "index";
const OBJECTS_DIR: &str = "objects";

#[derive(Debug)]
pub struct Repository {
    config: RepositoryConfig,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(config: RepositoryConfig) -> Self {
        let twig_path = config.twig_dir();

        let database = Database::new(twig_path.join(OBJECTS_DIR).into_boxed_path());
        let workspace = Workspace::new(config.root().to_path_buf().into_boxed_path());
        let refs = Refs::new(twig_path.into_boxed_path());

        Repository {
            config,
            database,
            workspace,
            refs,
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        self.config.root()
    }

    pub fn twig_path(&self) -> PathBuf {
        self.config.twig_dir()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn is_initialized(&self) -> bool {
        self.twig_path().is_dir()
    }

    pub(crate) fn ensure_initialized(&self) -> anyhow::Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(RepositoryError::NotInitialized.into())
        }
    }

    /// Take the repository-wide exclusive lock
    ///
    /// The lock is released when the returned guard is dropped.
    pub fn lock(&self) -> anyhow::Result<FileGuard<Box<File>>> {
        self.ensure_initialized()?;

        let lock_path = self.twig_path().join(LOCK_FILE);
        let lock_file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("failed to open lock file at {}", lock_path.display()))?;

        let guard = file_guard::lock(Box::new(lock_file), Lock::Exclusive, 0, 1)
            .with_context(|| format!("failed to lock {}", lock_path.display()))?;
        tracing::trace!(path = %lock_path.display(), "acquired repository lock");

        Ok(guard)
    }

    /// The stage as currently persisted
    pub fn load_index(&self) -> anyhow::Result<Index> {
        let mut index = Index::new(self.twig_path().join(INDEX_FILE).into_boxed_path());
        index.rehydrate()?;

        Ok(index)
    }

    pub fn current_branch(&self) -> anyhow::Result<BranchName> {
        self.refs.current_branch()
    }

    /// HEAD's commit, or `None` before the first commit
    pub fn head_commit(&self) -> anyhow::Result<Option<(ObjectId, Commit)>> {
        match self.refs.read_head()? {
            Some(oid) => {
                let commit = self.database.load_commit(&oid)?;
                Ok(Some((oid, commit)))
            }
            None => Ok(None),
        }
    }

    /// HEAD's commit, failing when the current branch is unborn
    pub(crate) fn require_head_commit(&self) -> anyhow::Result<(ObjectId, Commit)> {
        match self.head_commit()? {
            Some(head) => Ok(head),
            None => Err(RepositoryError::NoCommitsYet(self.current_branch()?.to_string()).into()),
        }
    }

    /// Files tracked by HEAD; empty before the first commit
    pub fn head_tracked_files(&self) -> anyhow::Result<TrackedFiles> {
        Ok(self
            .head_commit()?
            .map(|(_, commit)| commit.tracked_files().clone())
            .unwrap_or_default())
    }

    /// Resolve a full or abbreviated commit ID
    pub fn resolve_commit(&self, commit_id: &str) -> anyhow::Result<ObjectId> {
        if commit_id.is_empty() {
            return Err(RepositoryError::NoSuchCommit(commit_id.to_string()).into());
        }

        let mut candidates = Vec::new();
        for oid in self.database.find_objects_by_prefix(commit_id)? {
            if self.database.object_type(&oid)? == ObjectType::Commit {
                candidates.push(oid);
            }
        }

        match candidates.len() {
            0 => Err(RepositoryError::NoSuchCommit(commit_id.to_string()).into()),
            1 => Ok(candidates.remove(0)),
            _ => Err(RepositoryError::AmbiguousCommitId(commit_id.to_string()).into()),
        }
    }

    pub fn untracked_files(
        &self,
        head: &TrackedFiles,
        index: &Index,
    ) -> anyhow::Result<BTreeSet<PathBuf>> {
        Inspector::new(&self.workspace, head, index).untracked_files()
    }

    /// `path` relative to the working-tree root
    ///
    /// Relative paths are taken from the root. `.` and `..` are folded
    /// lexically; a path that ends up outside the root or inside `.twig` is
    /// refused, as is a name with a line break, which commit records cannot
    /// hold.
    pub(crate) fn relative_path(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let outside = || RepositoryError::OutsideWorkingTree(path.to_path_buf());
        let stripped = if path.is_absolute() {
            path.strip_prefix(self.path()).map_err(|_| outside())?
        } else {
            path
        };

        let mut relative = PathBuf::new();
        for component in stripped.components() {
            match component {
                Component::CurDir => {}
                Component::Normal(name) => {
                    if name.to_string_lossy().contains(['\n', '\r']) {
                        return Err(RepositoryError::UnsupportedPath(path.to_path_buf()).into());
                    }
                    relative.push(name);
                }
                Component::ParentDir => {
                    if !relative.pop() {
                        return Err(outside().into());
                    }
                }
                Component::RootDir | Component::Prefix(_) => return Err(outside().into()),
            }
        }

        let inside_twig = relative
            .components()
            .next()
            .is_some_and(|first| first.as_os_str() == TWIG_DIR);
        if inside_twig {
            return Err(outside().into());
        }

        Ok(relative)
    }

    /// Commit loader for history walks over the object store
    pub(crate) fn commit_loader(&self) -> impl Fn(&ObjectId) -> anyhow::Result<SlimCommit> + '_ {
        move |oid: &ObjectId| self.database.load_slim_commit(oid)
    }
}
