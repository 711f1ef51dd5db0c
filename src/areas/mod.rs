//! Core repository components
//!
//! - `database`: Content-addressed store for blobs and commits
//! - `index`: Staging area of pending additions and removals
//! - `refs`: Branch refs and HEAD
//! - `repository`: The handle tying the areas together
//! - `workspace`: Working-tree file system operations

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
