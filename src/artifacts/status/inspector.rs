use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::TrackedFiles;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Compares the working tree against the HEAD snapshot and the stage
#[derive(new)]
pub struct Inspector<'r> {
    workspace: &'r Workspace,
    head: &'r TrackedFiles,
    index: &'r Index,
}

impl<'r> Inspector<'r> {
    /// Blob ID the working copy of `path` would get, without storing it
    pub fn workspace_oid(&self, path: &Path) -> anyhow::Result<ObjectId> {
        Blob::new(self.workspace.read_file(path)?).object_id()
    }

    /// Files in the working tree the next commit would not record
    ///
    /// A file is untracked when it is not staged for addition and HEAD either
    /// does not track it or it is staged for removal.
    pub fn untracked_files(&self) -> anyhow::Result<BTreeSet<PathBuf>> {
        Ok(self
            .workspace
            .list_files()?
            .into_iter()
            .filter(|path| self.is_untracked(path))
            .collect())
    }

    pub fn is_untracked(&self, path: &Path) -> bool {
        !self.index.is_staged_for_addition(path)
            && (!self.head.contains_key(path) || self.index.is_staged_for_removal(path))
    }

    /// Changes to tracked or staged files that the stage does not capture
    pub fn workspace_changes(&self) -> anyhow::Result<BTreeMap<PathBuf, WorkspaceChangeType>> {
        let mut changes = BTreeMap::new();

        for (path, head_oid) in self.head {
            if !self.workspace.exists(path) {
                if !self.index.is_staged_for_removal(path) {
                    changes.insert(path.clone(), WorkspaceChangeType::Deleted);
                }
                continue;
            }

            let oid = self.workspace_oid(path)?;
            if &oid != head_oid && self.index.addition(path) != Some(&oid) {
                changes.insert(path.clone(), WorkspaceChangeType::Modified);
            }
        }

        for (path, staged_oid) in self.index.additions() {
            if !self.workspace.exists(path) {
                changes.insert(path.clone(), WorkspaceChangeType::Deleted);
            } else if &self.workspace_oid(path)? != staged_oid {
                changes.insert(path.clone(), WorkspaceChangeType::Modified);
            }
        }

        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;

    fn oid(content: &str) -> ObjectId {
        Blob::from(content.as_bytes()).object_id().unwrap()
    }

    #[test]
    fn classifies_working_tree_files() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        dir.child("same.txt").write_str("same")?;
        dir.child("edited.txt").write_str("edited")?;
        dir.child("staged.txt").write_str("staged")?;
        dir.child("staged_then_edited.txt").write_str("edited again")?;
        dir.child("removed_but_present.txt").write_str("back")?;
        dir.child("new.txt").write_str("new")?;

        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());
        let head = TrackedFiles::from([
            (PathBuf::from("same.txt"), oid("same")),
            (PathBuf::from("edited.txt"), oid("original")),
            (PathBuf::from("gone.txt"), oid("gone")),
            (PathBuf::from("removed_but_present.txt"), oid("back")),
        ]);
        let mut index = Index::new(dir.path().join(".twig/index").into_boxed_path());
        index.stage_addition(PathBuf::from("staged.txt"), oid("staged"));
        index.stage_addition(PathBuf::from("staged_then_edited.txt"), oid("first"));
        index.stage_addition(PathBuf::from("staged_missing.txt"), oid("missing"));
        index.stage_removal(PathBuf::from("removed_but_present.txt"));

        let inspector = Inspector::new(&workspace, &head, &index);

        assert_eq!(
            inspector.untracked_files()?,
            BTreeSet::from([
                PathBuf::from("new.txt"),
                PathBuf::from("removed_but_present.txt")
            ])
        );
        assert_eq!(
            inspector.workspace_changes()?,
            BTreeMap::from([
                (PathBuf::from("edited.txt"), WorkspaceChangeType::Modified),
                (PathBuf::from("gone.txt"), WorkspaceChangeType::Deleted),
                (PathBuf::from("staged_missing.txt"), WorkspaceChangeType::Deleted),
                (
                    PathBuf::from("staged_then_edited.txt"),
                    WorkspaceChangeType::Modified
                ),
            ])
        );
        Ok(())
    }
}
