//! Per-path three-way resolution
//!
//! Each side of a merge holds a blob for a path or does not track it at all.
//! Comparing the current and other versions against the split point decides
//! what happens to the path:
//!
//! | condition                              | result        |
//! |----------------------------------------|---------------|
//! | current == split, other != split       | take other    |
//! | other == split, or current == other    | keep current  |
//! | split, current, other all different    | conflict      |
//!
//! Absence counts as a version: a path deleted on one side and untouched on
//! the other is deleted, a path deleted on one side and edited on the other
//! conflicts.

use crate::artifacts::objects::object_id::ObjectId;
use bytes::{BufMut, Bytes, BytesMut};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The current branch's version stands, nothing to do
    KeepCurrent,
    /// Adopt the other branch's version; `None` means delete the path
    TakeOther(Option<ObjectId>),
    /// Both sides changed the path differently since the split point
    Conflict,
}

pub fn resolve(
    split: Option<&ObjectId>,
    current: Option<&ObjectId>,
    other: Option<&ObjectId>,
) -> Resolution {
    if current == split && other != split {
        Resolution::TakeOther(other.cloned())
    } else if other == split || current == other {
        Resolution::KeepCurrent
    } else {
        Resolution::Conflict
    }
}

const CONFLICT_START: &[u8] = b"<<<<<<< HEAD\n";
const CONFLICT_SEPARATOR: &[u8] = b"\n=======\n";
const CONFLICT_END: &[u8] = b">>>>>>>\n";

/// Frame both versions of a conflicted file; a missing side is empty
pub fn render_conflict(current: &[u8], other: &[u8]) -> Bytes {
    let mut content = BytesMut::with_capacity(
        CONFLICT_START.len()
            + current.len()
            + CONFLICT_SEPARATOR.len()
            + other.len()
            + CONFLICT_END.len(),
    );

    content.put_slice(CONFLICT_START);
    content.put_slice(current);
    content.put_slice(CONFLICT_SEPARATOR);
    content.put_slice(other);
    content.put_slice(CONFLICT_END);

    content.freeze()
}
