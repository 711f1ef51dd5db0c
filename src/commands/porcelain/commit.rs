use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::RepositoryError;

/// What `commit` recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub oid: ObjectId,
    pub branch: BranchName,
    pub is_root: bool,
    pub message: String,
}

impl Repository {
    /// Record HEAD's snapshot updated with the stage as a new commit
    pub fn commit(&self, message: &str) -> anyhow::Result<CommitSummary> {
        let _lock = self.lock()?;

        if message.trim().is_empty() {
            return Err(RepositoryError::MissingCommitMessage.into());
        }

        let mut index = self.load_index()?;
        if index.is_empty() {
            return Err(RepositoryError::NothingStaged.into());
        }

        let author = self.config().author()?;
        let head = self.head_commit()?;

        let mut tracked_files = head
            .as_ref()
            .map(|(_, commit)| commit.tracked_files().clone())
            .unwrap_or_default();
        for (path, oid) in index.additions() {
            tracked_files.insert(path.clone(), oid.clone());
        }
        for path in index.removals() {
            tracked_files.remove(path);
        }

        let parents = head.map(|(oid, _)| vec![oid]).unwrap_or_default();
        let is_root = parents.is_empty();
        let commit = Commit::new(parents, author, message.to_string(), tracked_files);

        let oid = self.database().store_commit(&commit)?;
        self.refs().update_head(&oid)?;

        index.clear();
        index.write_updates()?;

        let branch = self.current_branch()?;
        tracing::info!(%oid, %branch, is_root, "committed");

        Ok(CommitSummary {
            oid,
            branch,
            is_root,
            message: commit.message().to_string(),
        })
    }
}
