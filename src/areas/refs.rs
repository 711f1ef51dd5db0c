//! Branch references and HEAD
//!
//! ## File Format
//!
//! - `HEAD` holds `ref: refs/heads/<name>` and always names a branch.
//! - `refs/heads/<name>` holds the 40-character digest of the branch tip.
//!
//! A branch named by HEAD whose ref file does not exist yet is *unborn*: the
//! repository has no commits on it.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::RepositoryError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (typically `.twig`)
    path: Box<Path>,
}

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

impl Refs {
    /// Create `refs/heads` and point HEAD at the unborn `branch`
    pub fn initialize(&self, branch: &BranchName) -> anyhow::Result<()> {
        std::fs::create_dir_all(self.heads_path())
            .with_context(|| format!("failed to create {}", self.heads_path().display()))?;

        self.set_head(branch)
    }

    /// The branch HEAD points at
    pub fn current_branch(&self) -> anyhow::Result<BranchName> {
        let head_path = self.head_path();
        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read {}", head_path.display()))?;

        let symref_match = regex::Regex::new(SYMREF_REGEX)?
            .captures(content.trim())
            .with_context(|| format!("HEAD is not a symbolic ref: {:?}", content.trim()))?;

        BranchName::try_parse_sym_ref(&symref_match[1])
    }

    pub fn is_current_branch(&self, branch_name: &BranchName) -> anyhow::Result<bool> {
        Ok(&self.current_branch()? == branch_name)
    }

    /// Point HEAD at `branch`
    pub fn set_head(&self, branch: &BranchName) -> anyhow::Result<()> {
        self.update_ref_file(
            &self.head_path(),
            format!("ref: {}", branch.to_ref_path().display()),
        )
    }

    /// The commit HEAD resolves to, or `None` while its branch is unborn
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.read_branch(&self.current_branch()?)
    }

    /// Move the current branch to `oid`
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_branch(&self.current_branch()?, oid)
    }

    pub fn branch_exists(&self, branch_name: &BranchName) -> bool {
        self.branch_path(branch_name).is_file()
    }

    pub fn read_branch(&self, branch_name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let branch_path = self.branch_path(branch_name);

        if !branch_path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&branch_path)
            .with_context(|| format!("failed to read ref file at {}", branch_path.display()))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        Ok(Some(ObjectId::try_parse(content.to_string())?))
    }

    /// Create or move `branch_name` to `oid`
    pub fn update_branch(&self, branch_name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        tracing::debug!(branch = %branch_name, %oid, "updating branch");
        self.update_ref_file(&self.branch_path(branch_name), oid.as_ref().to_string())
    }

    pub fn create_branch(&self, name: &BranchName, source_oid: &ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            return Err(RepositoryError::BranchExists(name.to_string()).into());
        }

        self.update_branch(name, source_oid)
    }

    /// Delete the ref of `name`, returning the commit it pointed to
    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        let branch_path = self.branch_path(name);

        match self.read_branch(name)? {
            Some(oid) => {
                std::fs::remove_file(&branch_path).with_context(|| {
                    format!("failed to delete branch file at {}", branch_path.display())
                })?;
                self.prune_branch_empty_parent_dirs(&branch_path)?;

                Ok(oid)
            }
            None => Err(RepositoryError::NoSuchBranch(name.to_string()).into()),
        }
    }

    /// Every branch with a ref file, sorted by name
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads_path = self.heads_path();
        let mut branches = Vec::new();

        for entry in WalkDir::new(&heads_path) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative_path = entry.path().strip_prefix(&heads_path)?;
            let name = relative_path
                .to_str()
                .with_context(|| format!("branch path {relative_path:?} is not valid UTF-8"))?
                .replace(std::path::MAIN_SEPARATOR, "/");
            branches.push(BranchName::try_parse(name)?);
        }

        branches.sort();
        Ok(branches)
    }

    fn update_ref_file(&self, path: &Path, raw_ref: String) -> anyhow::Result<()> {
        // create all the parent directories if they don't exist
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {}",
                path.display()
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {}", path.display()))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!(
                    "failed to remove empty branch directory at {}",
                    parent.display()
                )
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    fn branch_path(&self, branch_name: &BranchName) -> Box<Path> {
        self.path.join(branch_name.to_ref_path()).into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.path.join("refs").join("heads").into_boxed_path()
    }
}
