use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::RepositoryError;
use std::path::Path;

impl Repository {
    /// Switch to branch `name`, replacing the working tree with its snapshot
    ///
    /// Refused without side effects when an untracked file would be
    /// overwritten or deleted.
    pub fn checkout_branch(&self, name: &str) -> anyhow::Result<()> {
        let _lock = self.lock()?;

        let target_branch = BranchName::try_parse(name.to_string())
            .map_err(|_| RepositoryError::NoSuchBranch(name.to_string()))?;
        let target_oid = self
            .refs()
            .read_branch(&target_branch)?
            .ok_or_else(|| RepositoryError::NoSuchBranch(name.to_string()))?;

        if self.refs().is_current_branch(&target_branch)? {
            return Err(RepositoryError::AlreadyOnBranch(name.to_string()).into());
        }

        let mut index = self.load_index()?;
        let head = self.head_tracked_files()?;
        let target = self.database().load_commit(&target_oid)?;

        let migration = Migration::between(self.database(), &head, target.tracked_files());
        migration.check_untracked(&self.untracked_files(&head, &index)?)?;
        self.workspace().apply_migration(&migration)?;

        index.clear();
        index.write_updates()?;
        self.refs().set_head(&target_branch)?;

        tracing::info!(branch = %target_branch, oid = %target_oid, "switched branch");
        Ok(())
    }

    /// Restore `path` from HEAD's commit
    pub fn checkout_head_file(&self, path: &Path) -> anyhow::Result<()> {
        let _lock = self.lock()?;
        let (head_oid, _) = self.require_head_commit()?;

        self.restore_file(&head_oid, path)
    }

    /// Restore `path` from the commit `commit_id` (full or abbreviated)
    ///
    /// HEAD, branches and the stage are left alone.
    pub fn checkout_file(&self, commit_id: &str, path: &Path) -> anyhow::Result<()> {
        let _lock = self.lock()?;
        let oid = self.resolve_commit(commit_id)?;

        self.restore_file(&oid, path)
    }

    fn restore_file(&self, oid: &ObjectId, path: &Path) -> anyhow::Result<()> {
        let path = self.relative_path(path)?;
        let commit = self.database().load_commit(oid)?;

        let blob_oid = commit
            .tracked_blob(&path)
            .ok_or_else(|| RepositoryError::FileNotInCommit(path.clone()))?;
        let blob = self.database().load_blob(blob_oid)?;
        self.workspace().write_file(&path, blob.content())?;

        tracing::debug!(path = %path.display(), commit = %oid, "restored file");
        Ok(())
    }
}
