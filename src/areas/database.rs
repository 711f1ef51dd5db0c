//! Content-addressed object store
//!
//! Objects live under `.twig/objects/<2 hex>/<38 hex>` in their canonical,
//! uncompressed encoding. The store is append-only: nothing is ever updated
//! or deleted, and storing content that is already present is a no-op.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    /// Read the canonical encoding of an object
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        if !object_path.is_file() {
            return Err(RepositoryError::ObjectNotFound(object_id.to_string()).into());
        }

        self.read_object(object_path)
    }

    /// Persist an object and return its ID
    ///
    /// Storing an object whose ID is already present leaves the existing
    /// file untouched.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_content = object.serialize()?;
        let object_id = ObjectId::digest(&object_content);
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            tracing::trace!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        std::fs::create_dir_all(
            object_path
                .parent()
                .context(format!("Invalid object path {}", object_path.display()))?,
        )
        .context(format!(
            "Unable to create object directory {}",
            object_path.display()
        ))?;

        self.write_object(object_path, object_content)?;
        tracing::debug!(oid = %object_id, kind = %object.object_type(), "stored object");

        Ok(object_id)
    }

    pub fn store_blob(&self, content: Bytes) -> anyhow::Result<ObjectId> {
        self.store(&Blob::new(content))
    }

    pub fn store_commit(&self, commit: &Commit) -> anyhow::Result<ObjectId> {
        self.store(commit)
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Blob::deserialize(object_reader),
            _ => Err(RepositoryError::NotABlob(object_id.to_string()).into()),
        }
    }

    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Commit => Commit::deserialize(object_reader).map_err(|err| {
                RepositoryError::CorruptObject {
                    oid: object_id.to_string(),
                    reason: err.to_string(),
                }
                .into()
            }),
            _ => Err(RepositoryError::NotACommit(object_id.to_string()).into()),
        }
    }

    pub fn load_slim_commit(&self, object_id: &ObjectId) -> anyhow::Result<SlimCommit> {
        Ok(self.load_commit(object_id)?.to_slim(object_id.clone()))
    }

    pub fn object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        let (object_type, _) = self.parse_object_as_bytes(object_id)?;
        Ok(object_type)
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let object_content = self.load(object_id)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader).map_err(|err| {
            RepositoryError::CorruptObject {
                oid: object_id.to_string(),
                reason: err.to_string(),
            }
        })?;

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Ok(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        let written = file
            .write_all(&object_content)
            .and_then(|_| file.sync_all())
            .context(format!(
                "Unable to write object file {}",
                temp_object_path.display()
            ))
            // rename the temp file to the object file to make it atomic
            .and_then(|_| {
                std::fs::rename(&temp_object_path, &object_path).context(format!(
                    "Unable to rename object file to {}",
                    object_path.display()
                ))
            });

        if written.is_err() {
            drop(file);
            if let Err(error) = std::fs::remove_file(&temp_object_path) {
                tracing::warn!(path = %temp_object_path.display(), %error, "left a temp object behind");
            }
        }

        written
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Every object ID in the store, in directory order
    pub fn object_ids(&self) -> anyhow::Result<Vec<ObjectId>> {
        let mut object_ids = Vec::new();

        if !self.path.is_dir() {
            return Ok(object_ids);
        }

        for dir in std::fs::read_dir(&self.path)? {
            let dir = dir?;
            if !dir.file_type()?.is_dir() {
                continue;
            }

            let dir_name = dir.file_name().to_string_lossy().to_string();
            for entry in std::fs::read_dir(dir.path())? {
                let file_name = entry?.file_name().to_string_lossy().to_string();
                // temp files and strays fail to parse and are skipped
                if let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                    object_ids.push(oid);
                }
            }
        }

        Ok(object_ids)
    }

    /// Every commit in the store, with no guaranteed order
    pub fn commit_ids(&self) -> anyhow::Result<Vec<ObjectId>> {
        let mut commit_ids = Vec::new();

        for oid in self.object_ids()? {
            if self.object_type(&oid)? == ObjectType::Commit {
                commit_ids.push(oid);
            }
        }

        Ok(commit_ids)
    }

    /// Find all objects whose ID starts with the given prefix.
    ///
    /// Used to resolve abbreviated IDs. An empty result means no match; more
    /// than one result means the prefix is ambiguous.
    ///
    /// # Performance
    ///
    /// - For prefixes of 2+ characters, only searches the specific directory
    /// - For shorter prefixes, must search all directories (slower)
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();

        if !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Vec::new());
        }

        if prefix.len() < 2 {
            return Ok(self
                .object_ids()?
                .into_iter()
                .filter(|oid| oid.as_ref().starts_with(&prefix))
                .collect());
        }

        let mut matches = Vec::new();
        let (dir_name, file_prefix) = prefix.split_at(2);
        let dir_path = self.path.join(dir_name);

        if dir_path.is_dir() {
            for entry in std::fs::read_dir(&dir_path)? {
                let file_name = entry?.file_name();
                let file_name = file_name.to_string_lossy();

                if file_name.starts_with(file_prefix)
                    && let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}"))
                {
                    matches.push(oid);
                }
            }
        }

        Ok(matches)
    }
}
