//! Walks along commit parent chains
//!
//! Both walks start at a commit, yield it, then step to one parent until a
//! root commit has been yielded:
//!
//! - [`FirstParentChain`] always follows the first parent. `log` uses it, so a
//!   branch's history stays on the line the branch was committed on.
//! - [`MergeAwareChain`] follows the second parent of a merge commit and the
//!   only parent otherwise. The lock-step split-point search walks it.
//!
//! Commits are fetched through a loader closure so the walks run equally over
//! the object store and over in-memory graphs in tests. A chain that reaches
//! a commit it already yielded stops with
//! [`RepositoryError::HistoryCycle`] rather than looping forever.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::RepositoryError;
use std::collections::HashSet;
use std::marker::PhantomData;

/// Picks the parent a chain steps to
pub trait ParentStep {
    fn next_parent(parents: &[ObjectId]) -> Option<&ObjectId>;
}

#[derive(Debug, Clone, Copy)]
pub struct FirstParent;

impl ParentStep for FirstParent {
    fn next_parent(parents: &[ObjectId]) -> Option<&ObjectId> {
        parents.first()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MergeAware;

impl ParentStep for MergeAware {
    fn next_parent(parents: &[ObjectId]) -> Option<&ObjectId> {
        match parents {
            [_, second] => Some(second),
            [only] => Some(only),
            _ => None,
        }
    }
}

pub struct Chain<L, S> {
    loader: L,
    next: Option<ObjectId>,
    seen: HashSet<ObjectId>,
    _step: PhantomData<S>,
}

pub type FirstParentChain<L> = Chain<L, FirstParent>;
pub type MergeAwareChain<L> = Chain<L, MergeAware>;

impl<L, S> Chain<L, S>
where
    L: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
    S: ParentStep,
{
    pub fn new(loader: L, start: ObjectId) -> Self {
        Self {
            loader,
            next: Some(start),
            seen: HashSet::new(),
            _step: PhantomData,
        }
    }
}

impl<L, S> Iterator for Chain<L, S>
where
    L: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
    S: ParentStep,
{
    type Item = anyhow::Result<SlimCommit>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = self.next.take()?;

        if !self.seen.insert(oid.clone()) {
            return Some(Err(RepositoryError::HistoryCycle(oid.to_string()).into()));
        }

        match (self.loader)(&oid) {
            Ok(commit) => {
                self.next = S::next_parent(&commit.parents).cloned();
                Some(Ok(commit))
            }
            Err(error) => Some(Err(error)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// In-memory commit graph for exercising walks and split-point searches
    #[derive(Debug, Clone, Default)]
    pub(crate) struct InMemoryCommitStore {
        commits: HashMap<ObjectId, SlimCommit>,
    }

    impl InMemoryCommitStore {
        pub(crate) fn add_commit(&mut self, name: &str, parents: &[&str]) -> ObjectId {
            // an hour apart, starting from 2022-01-01
            let timestamp_offset = self.commits.len() as i64 * 3600;
            let oid = create_oid(name);

            self.commits.insert(
                oid.clone(),
                SlimCommit {
                    oid: oid.clone(),
                    parents: parents.iter().map(|parent| create_oid(parent)).collect(),
                    timestamp: timestamp(1640995200 + timestamp_offset),
                },
            );

            oid
        }

        pub(crate) fn load(&self, oid: &ObjectId) -> anyhow::Result<SlimCommit> {
            self.commits
                .get(oid)
                .cloned()
                .ok_or_else(|| RepositoryError::ObjectNotFound(oid.to_string()).into())
        }
    }

    fn timestamp(seconds: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .and_then(|offset| offset.timestamp_opt(seconds, 0).single())
            .expect("valid test timestamp")
    }

    /// Deterministic 40-character ID derived from a readable name
    pub(crate) fn create_oid(name: &str) -> ObjectId {
        let mut hex_string = name
            .as_bytes()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<String>();

        while hex_string.len() < 40 {
            hex_string.push('0');
        }
        hex_string.truncate(40);

        ObjectId::try_parse(hex_string).expect("Invalid test ObjectId")
    }

    fn walk<S: ParentStep>(store: &InMemoryCommitStore, start: &str) -> Vec<ObjectId> {
        Chain::<_, S>::new(|oid: &ObjectId| store.load(oid), create_oid(start))
            .map(|commit| commit.map(|commit| commit.oid))
            .collect::<anyhow::Result<Vec<_>>>()
            .expect("walk succeeds")
    }

    //   a - b - d (merge of b and c)
    //    \     /
    //      c --
    fn merged_history() -> InMemoryCommitStore {
        let mut store = InMemoryCommitStore::default();
        store.add_commit("a", &[]);
        store.add_commit("b", &["a"]);
        store.add_commit("c", &["a"]);
        store.add_commit("d", &["b", "c"]);
        store
    }

    #[test]
    fn first_parent_chain_stays_on_the_mainline() {
        let store = merged_history();

        assert_eq!(
            walk::<FirstParent>(&store, "d"),
            vec![create_oid("d"), create_oid("b"), create_oid("a")]
        );
    }

    #[test]
    fn merge_aware_chain_follows_the_merged_in_branch() {
        let store = merged_history();

        assert_eq!(
            walk::<MergeAware>(&store, "d"),
            vec![create_oid("d"), create_oid("c"), create_oid("a")]
        );
    }

    #[test]
    fn revisiting_a_commit_is_reported_as_a_cycle() {
        let mut store = InMemoryCommitStore::default();
        store.add_commit("x", &["y"]);
        store.add_commit("y", &["x"]);

        let error = FirstParentChain::new(|oid: &ObjectId| store.load(oid), create_oid("x"))
            .collect::<anyhow::Result<Vec<_>>>()
            .unwrap_err();

        assert!(matches!(
            RepositoryError::find(&error),
            Some(RepositoryError::HistoryCycle(_))
        ));
    }
}
