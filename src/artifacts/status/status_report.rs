use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Snapshot of the repository state as `status` reports it
///
/// Every collection is sorted by path (or by name for branches).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub current_branch: BranchName,
    pub branches: Vec<BranchName>,
    /// Paths staged for addition
    pub staged: BTreeSet<PathBuf>,
    /// Paths staged for removal
    pub removed: BTreeSet<PathBuf>,
    /// Modifications not staged for commit
    pub unstaged: BTreeMap<PathBuf, WorkspaceChangeType>,
    pub untracked: BTreeSet<PathBuf>,
}

impl StatusReport {
    pub fn modified(&self) -> impl Iterator<Item = &PathBuf> {
        self.unstaged_with(WorkspaceChangeType::Modified)
    }

    pub fn deleted(&self) -> impl Iterator<Item = &PathBuf> {
        self.unstaged_with(WorkspaceChangeType::Deleted)
    }

    fn unstaged_with(&self, kind: WorkspaceChangeType) -> impl Iterator<Item = &PathBuf> {
        self.unstaged
            .iter()
            .filter(move |(_, change)| **change == kind)
            .map(|(path, _)| path)
    }

    pub fn is_current(&self, branch: &BranchName) -> bool {
        &self.current_branch == branch
    }

    /// Nothing staged, nothing changed, nothing untracked
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.removed.is_empty()
            && self.unstaged.is_empty()
            && self.untracked.is_empty()
    }
}
