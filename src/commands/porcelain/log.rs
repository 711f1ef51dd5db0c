use crate::areas::repository::Repository;
use crate::artifacts::history::FirstParentChain;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;

/// One commit as `log` and `global_log` report it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub oid: ObjectId,
    pub commit: Commit,
}

impl LogEntry {
    pub fn is_merge(&self) -> bool {
        self.commit.is_merge()
    }
}

impl Repository {
    /// History of the current branch, newest first, along first parents
    ///
    /// Empty while the current branch is unborn.
    pub fn log(&self) -> anyhow::Result<Vec<LogEntry>> {
        self.ensure_initialized()?;

        let Some(head) = self.refs().read_head()? else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for slim in FirstParentChain::new(self.commit_loader(), head) {
            let oid = slim?.oid;
            let commit = self.database().load_commit(&oid)?;
            entries.push(LogEntry { oid, commit });
        }

        Ok(entries)
    }

    /// Every commit in the object store, newest first
    ///
    /// Commits with the same timestamp are ordered by ID.
    pub fn global_log(&self) -> anyhow::Result<Vec<LogEntry>> {
        self.ensure_initialized()?;

        let mut entries = self
            .database()
            .commit_ids()?
            .into_iter()
            .map(|oid| {
                let commit = self.database().load_commit(&oid)?;
                Ok(LogEntry { oid, commit })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        entries.sort_by(|a, b| {
            b.commit
                .timestamp()
                .cmp(&a.commit.timestamp())
                .then_with(|| a.oid.cmp(&b.oid))
        });

        Ok(entries)
    }
}
