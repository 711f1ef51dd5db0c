//! Named repository failures
//!
//! Every public operation on [`Repository`](crate::areas::repository::Repository)
//! returns `anyhow::Result`. Failures the caller is expected to render are raised
//! as a [`RepositoryError`] so the command layer can recover them with
//! `anyhow::Error::downcast_ref` and pick an exit code from [`ErrorKind`].

use std::path::PathBuf;
use thiserror::Error;

/// Classification of a [`RepositoryError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input from the user: unknown ids, missing files, empty messages
    UserInput,
    /// The repository is not in a state that allows the operation
    Precondition,
    /// The object store is missing or holds malformed data
    StorageIntegrity,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Not in an initialized twig directory.")]
    NotInitialized,

    #[error("A twig version-control system already exists in the current directory.")]
    AlreadyInitialized,

    #[error("File does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No commit with that id exists.")]
    NoSuchCommit(String),

    #[error("Commit id {0} is ambiguous.")]
    AmbiguousCommitId(String),

    #[error("A branch with that name does not exist.")]
    NoSuchBranch(String),

    #[error("Invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("Please enter a commit message.")]
    MissingCommitMessage,

    #[error("Path is outside the working tree: {}", .0.display())]
    OutsideWorkingTree(PathBuf),

    #[error("File names containing line breaks are not supported: {}", .0.display())]
    UnsupportedPath(PathBuf),

    #[error("File does not exist in that commit.")]
    FileNotInCommit(PathBuf),

    #[error("Found no commit with that message.")]
    NoCommitWithMessage(String),

    #[error("No changes added to the commit.")]
    NothingStaged,

    #[error("No reason to remove the file.")]
    NoReasonToRemove(PathBuf),

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("Cannot merge a branch with itself.")]
    MergeWithSelf,

    #[error("A branch with that name already exists.")]
    BranchExists(String),

    #[error("Cannot remove the current branch.")]
    CannotRemoveCurrentBranch(String),

    #[error("No need to checkout the current branch.")]
    AlreadyOnBranch(String),

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedFileInTheWay(Vec<PathBuf>),

    #[error("Current branch {0} does not have any commits yet.")]
    NoCommitsYet(String),

    #[error("object {0} not found in the object store")]
    ObjectNotFound(String),

    #[error("object {0} is not a commit")]
    NotACommit(String),

    #[error("object {0} is not a blob")]
    NotABlob(String),

    #[error("object {oid} is corrupt: {reason}")]
    CorruptObject { oid: String, reason: String },

    #[error("commit history revisits {0}")]
    HistoryCycle(String),
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::NotInitialized
            | RepositoryError::FileNotFound(_)
            | RepositoryError::OutsideWorkingTree(_)
            | RepositoryError::UnsupportedPath(_)
            | RepositoryError::NoSuchCommit(_)
            | RepositoryError::AmbiguousCommitId(_)
            | RepositoryError::NoSuchBranch(_)
            | RepositoryError::InvalidBranchName(_)
            | RepositoryError::MissingCommitMessage
            | RepositoryError::FileNotInCommit(_)
            | RepositoryError::NoCommitWithMessage(_) => ErrorKind::UserInput,
            RepositoryError::AlreadyInitialized
            | RepositoryError::NothingStaged
            | RepositoryError::NoReasonToRemove(_)
            | RepositoryError::UncommittedChanges
            | RepositoryError::MergeWithSelf
            | RepositoryError::BranchExists(_)
            | RepositoryError::CannotRemoveCurrentBranch(_)
            | RepositoryError::AlreadyOnBranch(_)
            | RepositoryError::UntrackedFileInTheWay(_)
            | RepositoryError::NoCommitsYet(_) => ErrorKind::Precondition,
            RepositoryError::ObjectNotFound(_)
            | RepositoryError::NotACommit(_)
            | RepositoryError::NotABlob(_)
            | RepositoryError::CorruptObject { .. }
            | RepositoryError::HistoryCycle(_) => ErrorKind::StorageIntegrity,
        }
    }

    /// Find the [`RepositoryError`] carried by an `anyhow` error, if any
    pub fn find(error: &anyhow::Error) -> Option<&RepositoryError> {
        error.chain().find_map(|cause| cause.downcast_ref())
    }
}
