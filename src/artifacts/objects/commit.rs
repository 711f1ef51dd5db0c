//! Commit object
//!
//! A commit is an immutable snapshot of the tracked files plus the metadata
//! that places it in history:
//! - Parent commit IDs (none for the root, one normally, two for a merge)
//! - Author information with timestamp
//! - The tracked-file mapping (path to blob ID)
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! parent <parent-sha>
//! parent <second-parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! file <blob-sha> <path>
//!
//! <commit message>
//! ```
//!
//! Parent order is significant: the first parent is the branch that was
//! checked out when the commit was made, the second (merges only) is the
//! branch that was merged in.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Snapshot of tracked files: path to blob ID
pub type TrackedFiles = BTreeMap<PathBuf, ObjectId>;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Author information
///
/// Contains name, email, and timestamp with timezone information.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Create a new author with the current timestamp
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Parse a date given either as RFC 2822 or as `%Y-%m-%d %H:%M:%S %z`
    pub fn parse_date(date: &str) -> anyhow::Result<chrono::DateTime<chrono::FixedOffset>> {
        chrono::DateTime::parse_from_rfc2822(date)
            .or_else(|_| chrono::DateTime::parse_from_str(date, DATE_FORMAT))
            .with_context(|| format!("invalid author date {date:?}"))
    }

    /// String in format "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// String in format "Name <email> timestamp timezone"
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// String like "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Format: "name <email> timestamp timezone"
        // Split from right to get timezone and timestamp first
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(anyhow::anyhow!("Invalid author format"));
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("Invalid timestamp"))?;
        let name_email_part = parts[2];

        let email_start = name_email_part
            .find('<')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '<'"))?;
        let email_end = name_email_part
            .rfind('>')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '>'"))?;

        let name = name_email_part[..email_start].trim().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        let offset = chrono::DateTime::parse_from_str(
            &format!("1970-01-01 00:00:00 {timezone}"),
            DATE_FORMAT,
        )
        .map_err(|_| anyhow::anyhow!("Invalid timezone"))?
        .offset()
        .to_owned();
        let timestamp = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid timestamp"))?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

/// The parts of a commit that history walks need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlimCommit {
    pub oid: ObjectId,
    pub parents: Vec<ObjectId>,
    pub timestamp: chrono::DateTime<chrono::FixedOffset>,
}

/// Commit object
///
/// A single representation covers root, ordinary and merge commits; callers
/// branch on [`Commit::parents`] rather than on a type.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parents: Vec<ObjectId>,
    author: Author,
    tracked_files: TrackedFiles,
    message: String,
}

impl Commit {
    /// Build a pending commit. It has an ID but is not stored until handed
    /// to the database.
    pub fn new(
        parents: Vec<ObjectId>,
        author: Author,
        message: String,
        tracked_files: TrackedFiles,
    ) -> Self {
        debug_assert!(parents.len() <= 2, "a commit has at most two parents");

        Commit {
            parents,
            author,
            tracked_files,
            message,
        }
    }

    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// The first parent: the line of history the commit was made on
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    /// The merged-in parent of a merge commit
    pub fn second_parent(&self) -> Option<&ObjectId> {
        self.parents.get(1)
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() == 2
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.author.timestamp()
    }

    pub fn tracked_files(&self) -> &TrackedFiles {
        &self.tracked_files
    }

    pub fn tracked_blob(&self, path: &Path) -> Option<&ObjectId> {
        self.tracked_files.get(path)
    }

    pub fn tracks(&self, path: &Path) -> bool {
        self.tracked_files.contains_key(path)
    }

    pub fn to_slim(&self, oid: ObjectId) -> SlimCommit {
        SlimCommit {
            oid,
            parents: self.parents.clone(),
            timestamp: self.timestamp(),
        }
    }

    fn encode(&self) -> anyhow::Result<String> {
        let mut lines = vec![];

        for parent in &self.parents {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!("author {}", self.author.display()));
        for (path, oid) in &self.tracked_files {
            let path = path
                .to_str()
                .with_context(|| format!("path {} is not valid UTF-8", path.display()))?;
            if path.contains(['\n', '\r']) {
                anyhow::bail!("path {path:?} cannot be recorded in a commit");
            }
            lines.push(format!("file {} {}", oid.as_ref(), path));
        }
        lines.push(String::new());
        lines.push(self.message.to_string());

        Ok(lines.join("\n"))
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        frame(self.object_type(), self.encode()?.as_bytes())
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let (header, message) = content
            .split_once("\n\n")
            .context("Invalid commit object: missing message separator")?;

        let mut parents = Vec::new();
        let mut author = None;
        let mut tracked_files = TrackedFiles::new();

        for line in header.lines() {
            if let Some(parent) = line.strip_prefix("parent ") {
                parents.push(ObjectId::try_parse(parent.to_string())?);
            } else if let Some(value) = line.strip_prefix("author ") {
                author = Some(Author::try_from(value)?);
            } else if let Some(entry) = line.strip_prefix("file ") {
                let (oid, path) = entry
                    .split_once(' ')
                    .context("Invalid commit object: invalid file line")?;
                tracked_files.insert(PathBuf::from(path), ObjectId::try_parse(oid.to_string())?);
            } else {
                anyhow::bail!("Invalid commit object: unexpected line {line:?}");
            }
        }

        let author = author.context("Invalid commit object: missing author line")?;
        if parents.len() > 2 {
            anyhow::bail!("Invalid commit object: {} parents", parents.len());
        }

        Ok(Self::new(
            parents,
            author,
            message.to_string(),
            tracked_files,
        ))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
