//! Porcelain commands (user-facing version-control operations)
//!
//! ## Commands
//!
//! - `init`: Create the `.twig` layout with an unborn `master`
//! - `add` / `rm`: Stage a file for addition or removal
//! - `commit`: Snapshot HEAD plus the stage
//! - `log` / `global_log` / `find`: Read history
//! - `status`: Branches, stage and working-tree changes
//! - `checkout`: Switch branches or restore single files
//! - `branch` / `remove_branch`: Manage branch refs
//! - `reset`: Move the current branch and working tree to a commit
//! - `merge`: Three-way merge of another branch into the current one

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod find;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod rm;
pub mod status;
