use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::error::RepositoryError;

impl Repository {
    /// Create branch `name` at HEAD's commit without switching to it
    pub fn branch(&self, name: &str) -> anyhow::Result<()> {
        let _lock = self.lock()?;

        let branch_name = BranchName::try_parse(name.to_string())?;
        if self.refs().branch_exists(&branch_name) {
            return Err(RepositoryError::BranchExists(name.to_string()).into());
        }

        let (head_oid, _) = self.require_head_commit()?;
        self.refs().create_branch(&branch_name, &head_oid)?;

        tracing::info!(branch = %branch_name, oid = %head_oid, "created branch");
        Ok(())
    }

    /// Delete the ref of branch `name`; its commits stay in the store
    pub fn remove_branch(&self, name: &str) -> anyhow::Result<()> {
        let _lock = self.lock()?;

        let branch_name = BranchName::try_parse(name.to_string())
            .map_err(|_| RepositoryError::NoSuchBranch(name.to_string()))?;
        if !self.refs().branch_exists(&branch_name) {
            return Err(RepositoryError::NoSuchBranch(name.to_string()).into());
        }
        if self.refs().is_current_branch(&branch_name)? {
            return Err(RepositoryError::CannotRemoveCurrentBranch(name.to_string()).into());
        }

        let oid = self.refs().delete_branch(&branch_name)?;
        tracing::info!(branch = %branch_name, %oid, "removed branch");
        Ok(())
    }
}
