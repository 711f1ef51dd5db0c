//! Checksummed index stream
//!
//! Every byte of the index body goes through a [`Checksum`] wrapper, which
//! folds it into a running SHA-1. Writers append the digest as a trailer;
//! readers compare the trailer against the digest of what they consumed.

use crate::artifacts::index::CHECKSUM_SIZE;
use anyhow::{Context, bail};
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};

#[derive(Debug)]
pub struct Checksum<S> {
    stream: S,
    digest: Sha1,
}

impl<S> Checksum<S> {
    pub(crate) fn new(stream: S) -> Self {
        Checksum {
            stream,
            digest: Sha1::new(),
        }
    }

    fn current(&self) -> [u8; CHECKSUM_SIZE] {
        let mut checksum = [0u8; CHECKSUM_SIZE];
        checksum.copy_from_slice(&self.digest.clone().finalize());
        checksum
    }
}

impl<S: Read> Checksum<S> {
    /// Read exactly `size` bytes of the body
    pub(crate) fn read(&mut self, size: usize) -> anyhow::Result<Bytes> {
        let mut buffer = vec![0; size];
        self.stream
            .read_exact(&mut buffer)
            .context("index ended before all entries were read")?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    /// Check the trailer against the body read so far
    ///
    /// Bytes after the trailer are a corrupt index too.
    pub(crate) fn verify(mut self) -> anyhow::Result<()> {
        let mut stored = [0u8; CHECKSUM_SIZE];
        self.stream
            .read_exact(&mut stored)
            .context("index is missing its checksum")?;

        if stored != self.current() {
            bail!("index checksum does not match its content");
        }

        let mut rest = [0u8; 1];
        if self.stream.read(&mut rest)? != 0 {
            bail!("index has trailing bytes after its checksum");
        }

        Ok(())
    }
}

impl<S: Write> Checksum<S> {
    pub(crate) fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.stream.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    /// Append the trailer and flush
    pub(crate) fn finish(mut self) -> anyhow::Result<()> {
        let trailer = self.current();
        self.stream
            .write_all(&trailer)
            .context("failed to write index checksum")?;
        self.stream.flush()?;

        Ok(())
    }
}
