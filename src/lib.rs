//! twig: a small content-addressed version-control system
//!
//! The working tree lives next to a `.twig` directory that holds the object
//! store, the branch refs, HEAD and the staging index. Every operation is a
//! method on [`areas::repository::Repository`] and returns structured data;
//! the `twig` binary renders it.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod config;
pub mod error;
pub mod telemetry;
