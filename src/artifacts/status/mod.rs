//! Working tree status inspection
//!
//! ## Components
//!
//! - `file_change`: kinds of unstaged change
//! - `inspector`: compares the working tree against HEAD and the stage
//! - `status_report`: the aggregated result handed to callers

pub mod file_change;
pub mod inspector;
pub mod status_report;
