use crate::areas::repository::Repository;
use crate::artifacts::status::inspector::Inspector;
use crate::artifacts::status::status_report::StatusReport;

impl Repository {
    pub fn status(&self) -> anyhow::Result<StatusReport> {
        self.ensure_initialized()?;

        let head = self.head_tracked_files()?;
        let index = self.load_index()?;
        let inspector = Inspector::new(self.workspace(), &head, &index);

        let current_branch = self.current_branch()?;
        let mut branches = self.refs().list_branches()?;
        // an unborn current branch has no ref file yet but is still listed
        if !branches.contains(&current_branch) {
            branches.push(current_branch.clone());
            branches.sort();
        }

        Ok(StatusReport {
            current_branch,
            branches,
            staged: index.additions().keys().cloned().collect(),
            removed: index.removals().clone(),
            unstaged: inspector.workspace_changes()?,
            untracked: inspector.untracked_files()?,
        })
    }
}
