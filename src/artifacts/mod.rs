//! Data structures and algorithms
//!
//! - `branch`: Branch names
//! - `checkout`: Working-tree migrations and untracked-file detection
//! - `history`: Parent-chain walks
//! - `index`: On-disk format of the staging index
//! - `merge`: Split-point search and three-way resolution
//! - `objects`: Blobs, commits and their IDs
//! - `status`: Working tree status inspection

pub mod branch;
pub mod checkout;
pub mod history;
pub mod index;
pub mod merge;
pub mod objects;
pub mod status;
