use crate::artifacts::checkout::migration::{ActionType, Migration};
use crate::config::TWIG_DIR;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every regular file in the working tree, relative to the root and sorted
    pub fn list_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() != 1 || entry.file_name() != TWIG_DIR);

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            files.push(entry.path().strip_prefix(&self.path)?.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    pub fn exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let full_path = self.path.join(file_path);

        let content = std::fs::read(&full_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        Ok(content.into())
    }

    /// Write `data` to `file_path`, creating parent directories
    ///
    /// Anything in the way (a file where a directory is needed, or a
    /// directory where the file goes) is removed first.
    pub fn write_file(&self, file_path: &Path, data: &[u8]) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        if let Some(parent) = file_path.parent() {
            self.make_directory(parent)?;
        }

        if full_path.is_dir() {
            std::fs::remove_dir_all(&full_path).with_context(|| {
                format!("Failed to remove existing directory: {}", file_path.display())
            })?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&full_path)
            .with_context(|| format!("Failed to open file: {}", file_path.display()))?;

        file.write_all(data)
            .with_context(|| format!("Failed to write to file: {}", file_path.display()))?;

        Ok(())
    }

    /// Delete `file_path` if present, then prune directories left empty
    pub fn remove_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        if full_path.is_file() {
            std::fs::remove_file(&full_path)
                .with_context(|| format!("Failed to remove file: {}", file_path.display()))?;
        }

        self.prune_empty_parent_dirs(file_path)
    }

    // Deletions go first so that a directory vacated by the source snapshot
    // can be replaced by a file of the target.
    pub fn apply_migration(&self, migration: &Migration) -> anyhow::Result<()> {
        for file_path in migration.paths(ActionType::Delete) {
            self.remove_file(file_path)?;
        }

        for action in [ActionType::Modify, ActionType::Add] {
            for (file_path, oid) in migration.writes(action) {
                let data = migration.load_blob_data(oid)?;
                self.write_file(file_path, &data)?;
            }
        }

        Ok(())
    }

    fn make_directory(&self, dir_path: &Path) -> anyhow::Result<()> {
        // an ancestor that is a regular file has to go before the directory
        // can be created
        for ancestor in dir_path.ancestors().collect::<Vec<_>>().into_iter().rev() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }

            let full_path = self.path.join(ancestor);
            if full_path.is_file() {
                std::fs::remove_file(&full_path).with_context(|| {
                    format!("Failed to remove file in the way: {}", ancestor.display())
                })?;
            }
        }

        std::fs::create_dir_all(self.path.join(dir_path))
            .with_context(|| format!("Failed to create directory: {}", dir_path.display()))
    }

    fn prune_empty_parent_dirs(&self, file_path: &Path) -> anyhow::Result<()> {
        for parent in file_path.ancestors().skip(1) {
            if parent.as_os_str().is_empty() {
                break;
            }

            let full_path = self.path.join(parent);
            if !full_path.is_dir() || full_path.read_dir()?.next().is_some() {
                break;
            }

            std::fs::remove_dir(&full_path).with_context(|| {
                format!("Failed to remove empty directory: {}", parent.display())
            })?;
        }

        Ok(())
    }
}
