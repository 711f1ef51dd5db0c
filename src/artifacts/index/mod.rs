//! Staging index file format
//!
//! The staging index records the intents that the next commit will apply on
//! top of HEAD's snapshot: files staged for addition (with the blob they were
//! staged at) and files staged for removal.
//!
//! ## File Format (Version 1)
//!
//! ```text
//! Header (16 bytes):
//!   - Signature: "TWIX" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Addition count (4 bytes)
//!   - Removal count (4 bytes)
//!
//! Additions:
//!   - Object ID (20 bytes)
//!   - Path length (2 bytes) followed by the path
//!
//! Removals:
//!   - Path length (2 bytes) followed by the path
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```
//!
//! All integers are big-endian.

pub mod checksum;
pub mod index_header;
pub mod stage_entry;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 16;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "TWIX";

/// Index file format version
pub const VERSION: u32 = 1;
