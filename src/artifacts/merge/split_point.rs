//! Split-point search
//!
//! The split point of two branches is the commit a three-way merge compares
//! both heads against. Two strategies are available.
//!
//! ## Lock-step (default)
//!
//! Two pointers start at the current head and at the other head and advance
//! one commit per step along the merge-aware chain (second parent of a merge,
//! only parent otherwise). A pointer that runs past its root restarts at the
//! other branch's head. The first commit both pointers hold at the same step
//! is the split point. Splicing the chains end to end this way makes both
//! pointers cover the same number of commits, so they line up on the first
//! shared commit.
//!
//! For histories with merges of merges the spliced chains can skip the
//! nearest shared ancestor; the best-common-ancestor strategy handles those.
//!
//! ## Best common ancestor
//!
//! A breadth-first search over every parent, processing commits in
//! descending generation order (a commit's generation is one more than its
//! highest parent's), so a commit is only visited after all its descendants.
//! Commits reached from both heads are common ancestors; the best ones are
//! those that are not an ancestor of another common ancestor.

use crate::artifacts::history::MergeAwareChain;
use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::RepositoryError;
use bitflags::bitflags;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SplitPointStrategy {
    #[default]
    LockStep,
    BestCommonAncestor,
}

impl FromStr for SplitPointStrategy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "lockstep" | "lock-step" => Ok(SplitPointStrategy::LockStep),
            "best" | "bca" => Ok(SplitPointStrategy::BestCommonAncestor),
            _ => Err(anyhow::anyhow!(
                "unknown merge base strategy {value:?}, expected 'lockstep' or 'best'"
            )),
        }
    }
}

impl std::fmt::Display for SplitPointStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitPointStrategy::LockStep => write!(f, "lockstep"),
            SplitPointStrategy::BestCommonAncestor => write!(f, "best"),
        }
    }
}

/// Find the split point of `current` and `other` with `strategy`
pub fn find_split_point<L>(
    strategy: SplitPointStrategy,
    loader: L,
    current: &ObjectId,
    other: &ObjectId,
) -> anyhow::Result<ObjectId>
where
    L: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    let split_point = match strategy {
        SplitPointStrategy::LockStep => LockStepFinder::new(loader).find(current, other)?,
        SplitPointStrategy::BestCommonAncestor => {
            BCAFinder::new(loader).find_best_common_ancestor(current, other)?
        }
    };

    let split_point = split_point.ok_or_else(|| {
        anyhow::anyhow!("commits {current} and {other} share no history")
    })?;
    tracing::debug!(%strategy, %current, %other, %split_point, "found split point");

    Ok(split_point)
}

/// Whether `ancestor` is reachable from `descendant` through any parent
///
/// A commit counts as its own ancestor.
pub fn is_ancestor<L>(loader: L, ancestor: &ObjectId, descendant: &ObjectId) -> anyhow::Result<bool>
where
    L: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    CommitGraph::new(&loader).is_ancestor(ancestor, descendant)
}

pub struct LockStepFinder<L> {
    loader: L,
}

impl<L> LockStepFinder<L>
where
    L: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    /// `None` only when the two histories have no commit in common
    pub fn find(&self, current: &ObjectId, other: &ObjectId) -> anyhow::Result<Option<ObjectId>> {
        let mut mine = Pointer::new(&self.loader, current.clone(), other.clone());
        let mut theirs = Pointer::new(&self.loader, other.clone(), current.clone());

        loop {
            match (mine.advance()?, theirs.advance()?) {
                (Some(mine), Some(theirs)) if mine == theirs => return Ok(Some(mine)),
                (None, None) => return Ok(None),
                _ => {}
            }
        }
    }
}

/// One side of the lock-step walk
struct Pointer<'f, L> {
    loader: &'f L,
    chain: MergeAwareChain<&'f L>,
    restart: Option<ObjectId>,
}

impl<'f, L> Pointer<'f, L>
where
    L: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    fn new(loader: &'f L, start: ObjectId, restart: ObjectId) -> Self {
        Self {
            loader,
            chain: MergeAwareChain::new(loader, start),
            restart: Some(restart),
        }
    }

    fn advance(&mut self) -> anyhow::Result<Option<ObjectId>> {
        loop {
            match self.chain.next() {
                Some(commit) => return Ok(Some(commit?.oid)),
                None => match self.restart.take() {
                    Some(start) => self.chain = MergeAwareChain::new(self.loader, start),
                    None => return Ok(None),
                },
            }
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const NONE = 0b00;
        const VISITED_FROM_SOURCE = 0b01;
        const VISITED_FROM_TARGET = 0b10;
        const VISITED_FROM_BOTH = Self::VISITED_FROM_SOURCE.bits() | Self::VISITED_FROM_TARGET.bits();
        const STALE = 0b100; // parent of a common ancestor, cannot be the best one
        const RESULT = 0b1000; // common ancestor
    }
}

/// Parents and generation numbers, loaded on demand
struct CommitGraph<'f, L> {
    loader: &'f L,
    parents: HashMap<ObjectId, Vec<ObjectId>>,
    generations: HashMap<ObjectId, u64>,
}

impl<'f, L> CommitGraph<'f, L>
where
    L: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    fn new(loader: &'f L) -> Self {
        Self {
            loader,
            parents: HashMap::new(),
            generations: HashMap::new(),
        }
    }

    fn parents(&mut self, oid: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
        match self.parents.entry(oid.clone()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => Ok(entry.insert((self.loader)(oid)?.parents).clone()),
        }
    }

    fn generation(&mut self, oid: &ObjectId) -> anyhow::Result<u64> {
        if let Some(generation) = self.generations.get(oid) {
            return Ok(*generation);
        }

        // iterative post-order walk: a commit's generation needs its parents'
        let mut in_progress = HashSet::new();
        let mut stack = vec![(oid.clone(), false)];

        while let Some((commit_id, expanded)) = stack.pop() {
            if self.generations.contains_key(&commit_id) {
                continue;
            }

            let parents = self.parents(&commit_id)?;

            if expanded {
                let generation = parents
                    .iter()
                    .filter_map(|parent| self.generations.get(parent))
                    .max()
                    .map_or(1, |generation| generation + 1);
                self.generations.insert(commit_id.clone(), generation);
                in_progress.remove(&commit_id);
                continue;
            }

            in_progress.insert(commit_id.clone());
            stack.push((commit_id, true));
            for parent in parents {
                if in_progress.contains(&parent) {
                    return Err(RepositoryError::HistoryCycle(parent.to_string()).into());
                }
                if !self.generations.contains_key(&parent) {
                    stack.push((parent, false));
                }
            }
        }

        self.generations
            .get(oid)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no generation computed for {oid}"))
    }

    /// Whether `ancestor` is reachable from `descendant` through parents
    fn is_ancestor(&mut self, ancestor: &ObjectId, descendant: &ObjectId) -> anyhow::Result<bool> {
        let floor = self.generation(ancestor)?;
        let mut seen = HashSet::new();
        let mut queue = vec![descendant.clone()];

        while let Some(commit_id) = queue.pop() {
            if &commit_id == ancestor {
                return Ok(true);
            }
            if !seen.insert(commit_id.clone()) || self.generation(&commit_id)? <= floor {
                continue;
            }

            queue.extend(self.parents(&commit_id)?);
        }

        Ok(false)
    }
}

pub struct BCAFinder<L> {
    loader: L,
}

impl<L> BCAFinder<L>
where
    L: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    /// One best common ancestor of `source` and `target`
    ///
    /// When several exist (criss-cross histories) the one with the highest
    /// generation wins, ties broken by the smallest ID.
    pub fn find_best_common_ancestor(
        &self,
        source: &ObjectId,
        target: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        let mut graph = CommitGraph::new(&self.loader);
        let common_ancestors = Self::find_common_ancestors(&mut graph, source, target)?;

        let mut best_common_ancestors = Vec::new();
        for candidate in &common_ancestors {
            let mut redundant = false;
            for other in common_ancestors.iter().filter(|other| *other != candidate) {
                if graph.is_ancestor(candidate, other)? {
                    redundant = true;
                    break;
                }
            }

            if !redundant {
                best_common_ancestors.push((graph.generation(candidate)?, candidate.clone()));
            }
        }

        tracing::trace!(
            common = common_ancestors.len(),
            best = best_common_ancestors.len(),
            "filtered common ancestors"
        );

        Ok(best_common_ancestors
            .into_iter()
            .max_by(|(gen_a, oid_a), (gen_b, oid_b)| gen_a.cmp(gen_b).then(oid_b.cmp(oid_a)))
            .map(|(_, oid)| oid))
    }

    fn find_common_ancestors(
        graph: &mut CommitGraph<'_, L>,
        source: &ObjectId,
        target: &ObjectId,
    ) -> anyhow::Result<HashSet<ObjectId>> {
        if source == target {
            return Ok(HashSet::from([source.clone()]));
        }

        let mut ancestors_states = HashMap::<ObjectId, VisitState>::new();
        let mut priority_queue = BinaryHeap::new();

        ancestors_states.insert(source.clone(), VisitState::VISITED_FROM_SOURCE);
        priority_queue.push((graph.generation(source)?, source.clone()));
        ancestors_states.insert(target.clone(), VisitState::VISITED_FROM_TARGET);
        priority_queue.push((graph.generation(target)?, target.clone()));

        while let Some((_, commit_id)) = priority_queue.pop() {
            let current_state = ancestors_states
                .get(&commit_id)
                .copied()
                .unwrap_or(VisitState::NONE);

            tracing::trace!(commit = %commit_id, state = ?current_state, "visiting");

            if current_state.contains(VisitState::STALE) {
                continue;
            }

            let is_common_ancestor = current_state.contains(VisitState::VISITED_FROM_BOTH);
            if is_common_ancestor {
                ancestors_states
                    .entry(commit_id.clone())
                    .and_modify(|state| *state |= VisitState::RESULT);
            }

            for parent_id in graph.parents(&commit_id)? {
                let parent_state = ancestors_states
                    .get(&parent_id)
                    .copied()
                    .unwrap_or(VisitState::NONE);

                let mut new_state = parent_state | current_state;
                if is_common_ancestor {
                    new_state |= VisitState::STALE;
                }

                if new_state != parent_state {
                    ancestors_states.insert(parent_id.clone(), new_state);
                    priority_queue.push((graph.generation(&parent_id)?, parent_id));
                }
            }
        }

        Ok(ancestors_states
            .into_iter()
            .filter(|(_, state)| {
                !state.contains(VisitState::STALE) && state.contains(VisitState::RESULT)
            })
            .map(|(oid, _)| oid)
            .collect())
    }
}
