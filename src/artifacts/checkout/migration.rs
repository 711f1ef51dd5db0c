//! Checkout migration and untracked-file detection
//!
//! Moving the working tree from one snapshot to another is planned as a set
//! of per-path actions:
//!
//! - `Add`: the path is written and was not tracked by the source
//! - `Modify`: the path is written over a tracked file
//! - `Delete`: the tracked file is removed
//!
//! ## Safety
//!
//! Before anything is applied, [`Migration::check_untracked`] refuses the
//! whole migration if it would overwrite or delete a file the user never
//! committed. That includes writing a file below an untracked file's path, or
//! writing a file where an untracked file sits below it.

use crate::areas::database::Database;
use crate::artifacts::objects::commit::TrackedFiles;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::RepositoryError;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Type of file system action required for checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Create new file
    Add,
    /// Delete file
    Delete,
    /// Modify existing file
    Modify,
}

/// Set of planned actions grouped by type
///
/// Deletions carry no blob.
pub type ActionsSet = HashMap<ActionType, BTreeMap<PathBuf, Option<ObjectId>>>;

pub struct Migration<'r> {
    database: &'r Database,
    actions: ActionsSet,
}

impl<'r> Migration<'r> {
    pub fn new(database: &'r Database) -> Self {
        let actions = HashMap::from([
            (ActionType::Add, BTreeMap::new()),
            (ActionType::Delete, BTreeMap::new()),
            (ActionType::Modify, BTreeMap::new()),
        ]);

        Self { database, actions }
    }

    /// Plan the move from the `source` snapshot to the `target` snapshot
    ///
    /// Every target path is rewritten, even when the blob is unchanged, so
    /// that unstaged edits to tracked files are discarded.
    pub fn between(database: &'r Database, source: &TrackedFiles, target: &TrackedFiles) -> Self {
        let mut migration = Self::new(database);

        for path in source.keys().filter(|path| !target.contains_key(*path)) {
            migration.delete(path.clone());
        }
        for (path, oid) in target {
            if source.contains_key(path) {
                migration.modify(path.clone(), oid.clone());
            } else {
                migration.add(path.clone(), oid.clone());
            }
        }

        tracing::debug!(
            added = migration.paths(ActionType::Add).count(),
            modified = migration.paths(ActionType::Modify).count(),
            deleted = migration.paths(ActionType::Delete).count(),
            "planned migration"
        );

        migration
    }

    pub fn add(&mut self, path: PathBuf, oid: ObjectId) {
        self.record(ActionType::Add, path, Some(oid));
    }

    pub fn modify(&mut self, path: PathBuf, oid: ObjectId) {
        self.record(ActionType::Modify, path, Some(oid));
    }

    pub fn delete(&mut self, path: PathBuf) {
        self.record(ActionType::Delete, path, None);
    }

    fn record(&mut self, action: ActionType, path: PathBuf, oid: Option<ObjectId>) {
        self.actions.entry(action).or_default().insert(path, oid);
    }

    pub fn actions(&self) -> &ActionsSet {
        &self.actions
    }

    pub fn paths(&self, action: ActionType) -> impl Iterator<Item = &PathBuf> {
        self.actions
            .get(&action)
            .into_iter()
            .flat_map(|entries| entries.keys())
    }

    pub fn writes(&self, action: ActionType) -> impl Iterator<Item = (&PathBuf, &ObjectId)> {
        self.actions
            .get(&action)
            .into_iter()
            .flat_map(|entries| entries.iter())
            .filter_map(|(path, oid)| oid.as_ref().map(|oid| (path, oid)))
    }

    pub fn is_empty(&self) -> bool {
        self.actions.values().all(BTreeMap::is_empty)
    }

    pub fn load_blob_data(&self, oid: &ObjectId) -> anyhow::Result<Bytes> {
        Ok(self.database.load_blob(oid)?.into_content())
    }

    /// Refuse the migration if it would clobber any of `untracked`
    pub fn check_untracked(&self, untracked: &BTreeSet<PathBuf>) -> anyhow::Result<()> {
        let in_the_way = untracked
            .iter()
            .filter(|path| self.clobbers(path))
            .cloned()
            .collect::<Vec<_>>();

        if in_the_way.is_empty() {
            return Ok(());
        }

        tracing::debug!(paths = ?in_the_way, "untracked files block the migration");
        Err(RepositoryError::UntrackedFileInTheWay(in_the_way).into())
    }

    fn clobbers(&self, untracked: &Path) -> bool {
        if self.paths(ActionType::Delete).any(|path| path == untracked) {
            return true;
        }

        [ActionType::Add, ActionType::Modify]
            .into_iter()
            .flat_map(|action| self.paths(action))
            .any(|path| {
                path == untracked || path.starts_with(untracked) || untracked.starts_with(path)
            })
    }
}
