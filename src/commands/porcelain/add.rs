use crate::areas::repository::Repository;
use crate::error::RepositoryError;
use std::path::Path;

impl Repository {
    /// Stage the working copy of `path`
    ///
    /// Content identical to HEAD's version clears any marker for the path
    /// instead of staging it.
    pub fn add(&self, path: &Path) -> anyhow::Result<()> {
        let _lock = self.lock()?;
        let path = self.relative_path(path)?;

        if !self.workspace().exists(&path) {
            return Err(RepositoryError::FileNotFound(path).into());
        }

        let head = self.head_tracked_files()?;
        let mut index = self.load_index()?;

        let data = self.workspace().read_file(&path)?;
        let oid = self.database().store_blob(data)?;

        if head.get(&path) == Some(&oid) {
            index.unstage(&path);
            tracing::debug!(path = %path.display(), "content matches HEAD, unstaged");
        } else {
            tracing::debug!(path = %path.display(), %oid, "staged for addition");
            index.stage_addition(path, oid);
        }

        index.write_updates()
    }
}
