use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::RepositoryError;

impl Repository {
    /// IDs of every commit whose message is exactly `message`, sorted
    pub fn find(&self, message: &str) -> anyhow::Result<Vec<ObjectId>> {
        self.ensure_initialized()?;

        let mut matches = Vec::new();
        for oid in self.database().commit_ids()? {
            if self.database().load_commit(&oid)?.message() == message {
                matches.push(oid);
            }
        }

        if matches.is_empty() {
            return Err(RepositoryError::NoCommitWithMessage(message.to_string()).into());
        }

        matches.sort();
        Ok(matches)
    }
}
