use crate::artifacts::branch::{INVALID_BRANCH_NAME_REGEX, REF_PREFIX};
use crate::error::RepositoryError;
use anyhow::Context;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> anyhow::Result<Self> {
        if name.is_empty() {
            return Err(RepositoryError::InvalidBranchName(name).into());
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            Err(RepositoryError::InvalidBranchName(name).into())
        } else {
            Ok(Self(name))
        }
    }

    /// Parse the target of a symbolic ref such as `refs/heads/master`
    pub fn try_parse_sym_ref(sym_ref: &str) -> anyhow::Result<Self> {
        let name = sym_ref.strip_prefix(REF_PREFIX).with_context(|| {
            format!("symbolic ref must start with '{REF_PREFIX}', got '{sym_ref}'")
        })?;

        Self::try_parse(name.to_string())
    }

    /// `refs/heads/<name>`
    pub fn to_ref_path(&self) -> PathBuf {
        PathBuf::from(format!("{REF_PREFIX}{}", self.0))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    proptest! {
        #[test]
        fn names_made_of_word_characters_are_valid(branch_name in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(branch_name).is_ok());
        }

        #[test]
        fn hierarchical_names_are_valid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{prefix}/{suffix}")).is_ok());
        }

        #[test]
        fn leading_dot_is_invalid(suffix in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(format!(".{suffix}")).is_err());
        }

        #[test]
        fn lock_suffix_is_invalid(prefix in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(format!("{prefix}.lock")).is_err());
        }

        #[test]
        fn consecutive_dots_are_invalid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{prefix}..{suffix}")).is_err());
        }

        #[test]
        fn slash_dot_is_invalid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{prefix}/.{suffix}")).is_err());
        }

        #[test]
        fn surrounding_slashes_are_invalid(name in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(format!("/{name}")).is_err());
            assert!(BranchName::try_parse(format!("{name}/")).is_err());
        }

        #[test]
        fn at_brace_is_invalid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{prefix}@{{{suffix}}}")).is_err());
        }

        #[test]
        fn control_characters_are_invalid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{prefix}\x00{suffix}")).is_err());
        }

        #[test]
        fn special_characters_are_invalid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+",
            special_char in r"[\*:\?\[\\^~ ]"
        ) {
            assert!(BranchName::try_parse(format!("{prefix}{special_char}{suffix}")).is_err());
        }
    }

    #[test]
    fn empty_name_is_reported_as_invalid() {
        let error = BranchName::try_parse(String::new()).unwrap_err();
        assert!(matches!(
            RepositoryError::find(&error),
            Some(RepositoryError::InvalidBranchName(_))
        ));
    }

    #[test]
    fn sym_ref_targets_parse_to_branch_names() -> anyhow::Result<()> {
        let name = BranchName::try_parse_sym_ref("refs/heads/feature/x")?;

        assert_eq!(name.as_ref(), "feature/x");
        assert_eq!(name.to_ref_path(), PathBuf::from("refs/heads/feature/x"));
        assert!(BranchName::try_parse_sym_ref("HEAD").is_err());
        Ok(())
    }
}
