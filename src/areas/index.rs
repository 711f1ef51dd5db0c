//! Staging area
//!
//! The index records what the next commit changes relative to HEAD. Each path
//! is in exactly one of three states:
//!
//! - untouched (absent from both sets)
//! - staged for addition, at a specific blob
//! - staged for removal
//!
//! The two sets are kept disjoint by every mutator. The index is persisted to
//! `.twig/index` (see [`crate::artifacts::index`] for the format) and guarded
//! by a checksum.

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::stage_entry::{StagedAddition, StagedRemoval};
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::{Context, anyhow};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.twig/index`)
    path: Box<Path>,
    /// Files staged for addition, by path
    additions: BTreeMap<PathBuf, ObjectId>,
    /// Files staged for removal
    removals: BTreeSet<PathBuf>,
    /// Flag indicating if the index has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            additions: BTreeMap::new(),
            removals: BTreeSet::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the index from disk
    ///
    /// A missing or empty file is an empty index.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.additions.clear();
        self.removals.clear();
        self.changed = false;

        if !self.path.exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new()
            .read(true)
            .open(&self.path)
            .with_context(|| format!("failed to open index at {}", self.path.display()))?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(&mut **lock);
        let header = Self::parse_header(&mut reader)?;

        for _ in 0..header.additions_count {
            let addition = StagedAddition::read_from(&mut reader)?;
            self.additions.insert(addition.path, addition.oid);
        }
        for _ in 0..header.removals_count {
            let removal = StagedRemoval::read_from(&mut reader)?;
            self.removals.insert(removal.path);
        }

        reader.verify()
    }

    fn parse_header<R: Read>(reader: &mut Checksum<R>) -> anyhow::Result<IndexHeader> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(std::io::Cursor::new(header_bytes))?;

        if header.marker != SIGNATURE {
            return Err(anyhow!("Invalid index file signature"));
        }

        if header.version != VERSION {
            return Err(anyhow!(
                "Unsupported index file version: {}",
                header.version
            ));
        }

        Ok(header)
    }

    /// Persist the index
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on the index file during writing.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if !self.changed {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(&mut **lock);

        let header = IndexHeader {
            additions_count: self.additions.len() as u32,
            removals_count: self.removals.len() as u32,
            ..IndexHeader::empty()
        };
        writer.write(&header.serialize()?)?;

        for (path, oid) in &self.additions {
            writer.write(&StagedAddition::new(path.clone(), oid.clone()).serialize()?)?;
        }
        for path in &self.removals {
            writer.write(&StagedRemoval::new(path.clone()).serialize()?)?;
        }

        writer.finish()?;
        self.changed = false;

        Ok(())
    }

    /// Stage `path` for addition at `oid`, dropping any removal marker
    pub fn stage_addition(&mut self, path: PathBuf, oid: ObjectId) {
        self.removals.remove(&path);
        self.additions.insert(path, oid);
        self.changed = true;
    }

    /// Stage `path` for removal, dropping any addition marker
    pub fn stage_removal(&mut self, path: PathBuf) {
        self.additions.remove(&path);
        self.removals.insert(path);
        self.changed = true;
    }

    /// Return `path` to the untouched state
    ///
    /// Returns whether anything was staged for it.
    pub fn unstage(&mut self, path: &Path) -> bool {
        let was_staged = self.additions.remove(path).is_some() | self.removals.remove(path);
        self.changed |= was_staged;
        was_staged
    }

    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.changed = true;
        }
        self.additions.clear();
        self.removals.clear();
    }

    pub fn addition(&self, path: &Path) -> Option<&ObjectId> {
        self.additions.get(path)
    }

    pub fn is_staged_for_addition(&self, path: &Path) -> bool {
        self.additions.contains_key(path)
    }

    pub fn is_staged_for_removal(&self, path: &Path) -> bool {
        self.removals.contains(path)
    }

    pub fn additions(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.additions
    }

    pub fn removals(&self) -> &BTreeSet<PathBuf> {
        &self.removals
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }
}
