//! Branch names

pub mod branch_name;

/// Git's ref-name rules, expressed as the patterns a name must not match
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

/// Prefix of every branch ref, relative to the metadata directory
pub const REF_PREFIX: &str = "refs/heads/";
