//! Working-tree migrations
//!
//! A [`migration::Migration`] is planned in full, checked against the
//! untracked files of the working tree and only then applied, so a refused
//! checkout, reset or merge leaves no trace.

pub mod migration;
