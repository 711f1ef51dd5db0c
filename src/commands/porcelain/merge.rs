//! Three-way merge of another branch into the current one
//!
//! ## Algorithm
//!
//! 1. Validate: empty stage, existing branch, not the current branch
//! 2. The other head is reachable from the current one: nothing to do
//! 3. The current head is reachable from the other one: fast-forward
//! 4. Otherwise find the split point with the configured strategy, resolve
//!    every path of the three snapshots and record a merge commit, conflicts
//!    included
//!
//! Reachability in steps 2 and 3 follows every parent, whatever strategy
//! picks the split point.
//!
//! Nothing in the working tree, the stage or the refs changes before the
//! untracked-file check has passed.

use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::merge::resolve::{Resolution, render_conflict, resolve};
use crate::artifacts::merge::split_point::{find_split_point, is_ancestor};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, TrackedFiles};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::RepositoryError;
use bytes::Bytes;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The other branch is an ancestor of the current one
    AlreadyUpToDate,
    /// The current branch moved forward to the other head
    FastForward { from: ObjectId, to: ObjectId },
    /// A merge commit was recorded; `conflicts` lists the paths that got
    /// conflict markers
    Merged {
        commit: ObjectId,
        conflicts: Vec<PathBuf>,
    },
}

impl MergeOutcome {
    pub fn has_conflicts(&self) -> bool {
        matches!(self, MergeOutcome::Merged { conflicts, .. } if !conflicts.is_empty())
    }
}

/// The snapshot a merge produces before anything is written
struct MergePlan<'r> {
    migration: Migration<'r>,
    tracked_files: TrackedFiles,
    conflict_blobs: Vec<Blob>,
    conflicts: Vec<PathBuf>,
}

impl Repository {
    /// Merge branch `name` into the current branch
    pub fn merge(&self, name: &str) -> anyhow::Result<MergeOutcome> {
        let _lock = self.lock()?;

        let mut index = self.load_index()?;
        if !index.is_empty() {
            return Err(RepositoryError::UncommittedChanges.into());
        }

        let other_branch = BranchName::try_parse(name.to_string())
            .map_err(|_| RepositoryError::NoSuchBranch(name.to_string()))?;
        let other_oid = self
            .refs()
            .read_branch(&other_branch)?
            .ok_or_else(|| RepositoryError::NoSuchBranch(name.to_string()))?;

        let current_branch = self.current_branch()?;
        if current_branch == other_branch {
            return Err(RepositoryError::MergeWithSelf.into());
        }

        let (current_oid, current) = self.require_head_commit()?;
        let loader = self.commit_loader();

        if is_ancestor(&loader, &other_oid, &current_oid)? {
            tracing::info!(branch = %other_branch, "already up to date");
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        let other = self.database().load_commit(&other_oid)?;
        let untracked = self.untracked_files(current.tracked_files(), &index)?;

        if is_ancestor(&loader, &current_oid, &other_oid)? {
            let migration =
                Migration::between(self.database(), current.tracked_files(), other.tracked_files());
            migration.check_untracked(&untracked)?;
            self.workspace().apply_migration(&migration)?;

            index.clear();
            index.write_updates()?;
            self.refs().update_head(&other_oid)?;

            tracing::info!(from = %current_oid, to = %other_oid, "fast-forwarded");
            return Ok(MergeOutcome::FastForward {
                from: current_oid,
                to: other_oid,
            });
        }

        let split_oid = find_split_point(
            self.config().split_point_strategy(),
            &loader,
            &current_oid,
            &other_oid,
        )?;
        let split = self.database().load_commit(&split_oid)?;
        let plan = self.plan_merge(&split, &current, &other)?;

        let author = self.config().author()?;
        plan.migration.check_untracked(&untracked)?;

        for blob in &plan.conflict_blobs {
            self.database().store(blob)?;
        }
        self.workspace().apply_migration(&plan.migration)?;

        let message = format!("Merged {other_branch} into {current_branch}.");
        let commit = Commit::new(
            vec![current_oid, other_oid],
            author,
            message,
            plan.tracked_files,
        );
        let commit_oid = self.database().store_commit(&commit)?;
        self.refs().update_head(&commit_oid)?;

        index.clear();
        index.write_updates()?;

        tracing::info!(
            oid = %commit_oid,
            conflicts = plan.conflicts.len(),
            "recorded merge commit"
        );

        Ok(MergeOutcome::Merged {
            commit: commit_oid,
            conflicts: plan.conflicts,
        })
    }

    fn plan_merge(
        &self,
        split: &Commit,
        current: &Commit,
        other: &Commit,
    ) -> anyhow::Result<MergePlan<'_>> {
        let paths = split
            .tracked_files()
            .keys()
            .chain(current.tracked_files().keys())
            .chain(other.tracked_files().keys())
            .cloned()
            .collect::<BTreeSet<_>>();

        let mut plan = MergePlan {
            migration: Migration::new(self.database()),
            tracked_files: current.tracked_files().clone(),
            conflict_blobs: Vec::new(),
            conflicts: Vec::new(),
        };

        for path in paths {
            let current_blob = current.tracked_blob(&path);
            let other_blob = other.tracked_blob(&path);

            match resolve(split.tracked_blob(&path), current_blob, other_blob) {
                Resolution::KeepCurrent => {}
                Resolution::TakeOther(Some(oid)) => {
                    plan.write(path, oid, current_blob.is_some());
                }
                Resolution::TakeOther(None) => {
                    plan.tracked_files.remove(&path);
                    plan.migration.delete(path);
                }
                Resolution::Conflict => {
                    let content = render_conflict(
                        &self.blob_content(current_blob)?,
                        &self.blob_content(other_blob)?,
                    );
                    let blob = Blob::new(content);
                    let oid = blob.object_id()?;

                    tracing::debug!(path = %path.display(), "conflict");
                    plan.conflicts.push(path.clone());
                    plan.conflict_blobs.push(blob);
                    plan.write(path, oid, current_blob.is_some());
                }
            }
        }

        Ok(plan)
    }

    fn blob_content(&self, oid: Option<&ObjectId>) -> anyhow::Result<Bytes> {
        match oid {
            Some(oid) => Ok(self.database().load_blob(oid)?.into_content()),
            None => Ok(Bytes::new()),
        }
    }
}

impl MergePlan<'_> {
    fn write(&mut self, path: PathBuf, oid: ObjectId, tracked_by_current: bool) {
        self.tracked_files.insert(path.clone(), oid.clone());
        if tracked_by_current {
            self.migration.modify(path, oid);
        } else {
            self.migration.add(path, oid);
        }
    }
}
