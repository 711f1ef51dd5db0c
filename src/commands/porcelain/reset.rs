use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Migration;

impl Repository {
    /// Move the current branch to `commit_id` and check out its snapshot
    pub fn reset(&self, commit_id: &str) -> anyhow::Result<()> {
        let _lock = self.lock()?;

        let target_oid = self.resolve_commit(commit_id)?;
        let target = self.database().load_commit(&target_oid)?;

        let mut index = self.load_index()?;
        let head = self.head_tracked_files()?;

        let migration = Migration::between(self.database(), &head, target.tracked_files());
        migration.check_untracked(&self.untracked_files(&head, &index)?)?;
        self.workspace().apply_migration(&migration)?;

        index.clear();
        index.write_updates()?;
        self.refs().update_head(&target_oid)?;

        tracing::info!(oid = %target_oid, "reset current branch");
        Ok(())
    }
}
