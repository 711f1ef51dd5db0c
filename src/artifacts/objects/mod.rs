//! Stored object types
//!
//! Everything the object store holds is one of two kinds:
//!
//! - **Blob**: the raw bytes of one file version
//! - **Commit**: a snapshot (path to blob mapping) plus message, author and parents
//!
//! Both serialize to `<type> <size>\0<content>` and are identified by the
//! SHA-1 of that encoding.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-1 hash in raw bytes
pub const OBJECT_ID_BYTES: usize = OBJECT_ID_LENGTH / 2;
