//! The small part of the GitHub REST API needed to report submission statuses.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod client;
pub use client::GitHubClient;

#[cfg(test)]
pub(crate) mod testing;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("`{0}` was not found on GitHub")]
    NotFound(String),
    #[error("GitHub API URL `{0}` can't have paths appended")]
    BaseUrl(url::Url),
    #[error("GitHub token can't be used in a header")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Success,
    Failure,
    Pending,
    Error,
}

impl StatusState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Pending => "pending",
            Self::Error => "error",
        }
    }
}

impl Display for StatusState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status to attach to a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitStatus {
    pub state: StatusState,
    pub context: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitRef {
    pub object: GitObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitObject {
    pub sha: String,
    /// `commit` for lightweight tags, `tag` for annotated ones
    #[serde(rename = "type")]
    pub kind: String,
}

impl GitObject {
    pub fn is_tag(&self) -> bool {
        self.kind == "tag"
    }
}

/// An annotated tag object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitTag {
    pub object: GitObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CombinedStatus {
    pub statuses: Vec<RepoStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoStatus {
    pub state: StatusState,
    pub context: String,
    pub updated_at: DateTime<Utc>,
}

/// Operations consumed from GitHub. `repo` is always the `owner/name` of a repository.
#[rocket::async_trait]
pub trait GitHubApi: Send + Sync {
    /// Attaches a status to a commit. Posting the same status twice is harmless.
    async fn create_commit_status(&self, repo: &str, sha: &str, status: &CommitStatus)
        -> Result<()>;

    /// Looks up `refs/tags/<tag>`.
    async fn tag_ref(&self, repo: &str, tag: &str) -> Result<GitRef>;

    /// Fetches an annotated tag object.
    async fn tag_object(&self, repo: &str, sha: &str) -> Result<GitTag>;

    async fn combined_status(&self, repo: &str, sha: &str) -> Result<CombinedStatus>;
}
