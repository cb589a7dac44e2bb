//! Read access to the classroom records a webhook delivery refers to.
//!
//! Webhooks never create or delete records. The only write is the one-time flip of an
//! organization's `webhook_active` flag on its first ping.

use thiserror::Error;

mod memory;
mod models;

pub use memory::{MemoryStore, StoreSnapshot};
pub use models::*;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("couldn't access store file: {0}")]
    Io(#[from] std::io::Error),
    #[error("couldn't read or write store snapshot: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[rocket::async_trait]
pub trait Store: Send + Sync {
    async fn organization_by_github_id(&self, github_id: u64) -> Result<Option<Organization>>;

    async fn user_by_uid(&self, uid: u64) -> Result<Option<User>>;

    async fn assignment_repo_by_github_id(&self, github_repo_id: u64)
        -> Result<Option<AssignmentRepo>>;

    async fn group_assignment_repo_by_github_id(
        &self,
        github_repo_id: u64,
    ) -> Result<Option<GroupAssignmentRepo>>;

    async fn assignment(&self, id: u64) -> Result<Option<Assignment>>;

    async fn group_assignment(&self, id: u64) -> Result<Option<GroupAssignment>>;

    /// Updates the `webhook_active` flag of an organization. Unknown organizations are ignored.
    async fn set_webhook_active(&self, github_id: u64, active: bool) -> Result<()>;
}
