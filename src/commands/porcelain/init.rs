use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::config::DEFAULT_BRANCH;
use crate::error::RepositoryError;
use anyhow::Context;

impl Repository {
    /// Create the metadata directory and point HEAD at an unborn `master`
    pub fn init(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(self.path())
            .with_context(|| format!("failed to create {}", self.path().display()))?;

        let twig_path = self.twig_path();
        match std::fs::create_dir(&twig_path) {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(RepositoryError::AlreadyInitialized.into());
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to create {}", twig_path.display()));
            }
        }

        std::fs::create_dir_all(self.database().objects_path()).with_context(|| {
            format!(
                "failed to create {}",
                self.database().objects_path().display()
            )
        })?;
        self.refs()
            .initialize(&BranchName::try_parse(DEFAULT_BRANCH.to_string())?)?;

        tracing::info!(path = %twig_path.display(), "initialized empty repository");
        Ok(())
    }
}
