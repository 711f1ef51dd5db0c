//! Merge algorithms
//!
//! - `split_point`: where two branch histories diverged
//! - `resolve`: per-path three-way decisions and conflict rendering

pub mod resolve;
pub mod split_point;
