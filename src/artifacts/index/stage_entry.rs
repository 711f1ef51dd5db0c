//! Staged entries
//!
//! An addition carries the blob the file was staged at; a removal is just a
//! path. Paths are written as a big-endian `u16` length followed by the UTF-8
//! bytes of the `/`-separated relative path.

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::objects::OBJECT_ID_BYTES;
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use byteorder::{ByteOrder, NetworkEndian, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// A file staged for addition
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct StagedAddition {
    pub path: PathBuf,
    pub oid: ObjectId,
}

/// A file staged for removal
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct StagedRemoval {
    pub path: PathBuf,
}

impl StagedAddition {
    pub(crate) fn read_from<R: Read>(reader: &mut Checksum<R>) -> anyhow::Result<Self> {
        let oid_bytes = reader.read(OBJECT_ID_BYTES)?;
        let oid = ObjectId::read_h40_from(&mut oid_bytes.as_ref())?;
        let path = read_path(reader)?;

        Ok(Self::new(path, oid))
    }
}

impl StagedRemoval {
    pub(crate) fn read_from<R: Read>(reader: &mut Checksum<R>) -> anyhow::Result<Self> {
        Ok(Self::new(read_path(reader)?))
    }
}

impl Packable for StagedAddition {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::new();
        self.oid.write_h40_to(&mut bytes)?;
        write_path(&mut bytes, &self.path)?;

        Ok(Bytes::from(bytes))
    }
}

impl Packable for StagedRemoval {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::new();
        write_path(&mut bytes, &self.path)?;

        Ok(Bytes::from(bytes))
    }
}

fn write_path(bytes: &mut Vec<u8>, path: &Path) -> anyhow::Result<()> {
    let path = path
        .to_str()
        .with_context(|| format!("path {} is not valid UTF-8", path.display()))?;
    let length = u16::try_from(path.len())
        .with_context(|| format!("path {path} is too long for the index"))?;

    bytes.write_u16::<NetworkEndian>(length)?;
    bytes.write_all(path.as_bytes())?;

    Ok(())
}

fn read_path<R: Read>(reader: &mut Checksum<R>) -> anyhow::Result<PathBuf> {
    let length = NetworkEndian::read_u16(&reader.read(2)?);
    let path = reader.read(length as usize)?;
    let path = String::from_utf8(path.to_vec()).context("index path is not valid UTF-8")?;

    Ok(PathBuf::from(path))
}
