use crate::areas::repository::Repository;
use crate::error::RepositoryError;
use std::path::Path;

impl Repository {
    /// Unstage `path`, or stage the removal of a tracked file
    ///
    /// Removing a tracked file also deletes its working copy.
    pub fn rm(&self, path: &Path) -> anyhow::Result<()> {
        let _lock = self.lock()?;
        let path = self.relative_path(path)?;

        let head = self.head_tracked_files()?;
        let mut index = self.load_index()?;

        if index.is_staged_for_addition(&path) {
            index.unstage(&path);
        } else if head.contains_key(&path) {
            self.workspace().remove_file(&path)?;
            index.stage_removal(path);
        } else {
            return Err(RepositoryError::NoReasonToRemove(path).into());
        }

        index.write_updates()
    }
}
