use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    errors::WebhookError,
    github::{ApiError, CommitStatus, GitHubApi, StatusState},
};

/// Context of the status attached to every pushed commit.
pub const PUSH_CONTEXT: &str = "classroom/push";
/// Context of the status attached to the commit a release points to.
pub const SUBMISSION_CONTEXT: &str = "classroom/assignment-submission";

// tags pointing to tags pointing to ... a commit
const MAX_TAG_DEPTH: usize = 4;

/// Reports statuses on the commits of one repository.
pub struct StatusReporter<'a> {
    github: &'a dyn GitHubApi,
    repo: &'a str,
}

impl<'a> StatusReporter<'a> {
    pub fn new(github: &'a dyn GitHubApi, repo: &'a str) -> Self {
        Self { github, repo }
    }

    pub async fn attach(
        &self,
        sha: &str,
        state: StatusState,
        context: &str,
        description: &str,
    ) -> Result<(), ApiError> {
        let status = CommitStatus {
            state,
            context: context.to_owned(),
            description: description.to_owned(),
        };
        self.github
            .create_commit_status(self.repo, sha, &status)
            .await?;

        info!("set `{}` to {} on {}@{}", context, state, self.repo, sha);
        Ok(())
    }

    /// Finds the commit a tag currently points to.
    pub async fn resolve_tag(&self, tag: &str) -> Result<String, ApiError> {
        let mut object = self.github.tag_ref(self.repo, tag).await?.object;

        let mut depth = 0;
        while object.is_tag() {
            if depth == MAX_TAG_DEPTH {
                return Err(ApiError::NotFound(format!(
                    "commit of tag {} in {}",
                    tag, self.repo
                )));
            }
            object = self.github.tag_object(self.repo, &object.sha).await?.object;
            depth += 1;
        }

        debug!("tag {} points to {} {}", tag, object.kind, object.sha);
        Ok(object.sha)
    }

    /// When a commit was pushed, according to the push status attached to it.
    pub async fn pushed_at(&self, sha: &str) -> Result<DateTime<Utc>, WebhookError> {
        let combined = self.github.combined_status(self.repo, sha).await?;

        let status = combined
            .statuses
            .iter()
            .find(|status| status.context == PUSH_CONTEXT)
            .ok_or_else(|| WebhookError::MissingPriorStatus {
                sha: sha.to_owned(),
                context: PUSH_CONTEXT,
            })?;

        debug!("{} was pushed at {} ({})", sha, status.updated_at, status.state);
        Ok(status.updated_at)
    }
}
