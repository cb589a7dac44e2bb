use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use crate::github::{
    ApiError, CombinedStatus, CommitStatus, GitHubApi, GitObject, GitRef, GitTag, RepoStatus,
    Result,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StatusCall {
    pub repo: String,
    pub sha: String,
    pub status: CommitStatus,
}

/// Answers lookups from fixed tables and records every status it is asked to create.
#[derive(Debug, Default)]
pub(crate) struct RecordingGitHub {
    /// tag name -> object the tag ref points to
    pub refs: HashMap<String, GitObject>,
    /// annotated tag sha -> tagged object
    pub tags: HashMap<String, GitObject>,
    /// commit sha -> statuses already attached to it
    pub statuses: HashMap<String, Vec<RepoStatus>>,
    /// commits for which creating a status fails
    pub failing_commits: HashSet<String>,
    calls: Mutex<Vec<StatusCall>>,
}

impl RecordingGitHub {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_ref(mut self, tag: &str, sha: &str) -> Self {
        self.refs.insert(tag.to_owned(), commit_object(sha));
        self
    }

    pub fn with_status(mut self, sha: &str, status: RepoStatus) -> Self {
        self.statuses.entry(sha.to_owned()).or_default().push(status);
        self
    }

    pub fn calls(&self) -> Vec<StatusCall> {
        self.calls.lock().unwrap().clone()
    }
}

pub(crate) fn commit_object(sha: &str) -> GitObject {
    GitObject {
        sha: sha.to_owned(),
        kind: "commit".to_owned(),
    }
}

#[rocket::async_trait]
impl GitHubApi for RecordingGitHub {
    async fn create_commit_status(
        &self,
        repo: &str,
        sha: &str,
        status: &CommitStatus,
    ) -> Result<()> {
        if self.failing_commits.contains(sha) {
            return Err(ApiError::NotFound(format!("repos/{}/statuses/{}", repo, sha)));
        }

        self.calls.lock().unwrap().push(StatusCall {
            repo: repo.to_owned(),
            sha: sha.to_owned(),
            status: status.clone(),
        });
        Ok(())
    }

    async fn tag_ref(&self, repo: &str, tag: &str) -> Result<GitRef> {
        self.refs
            .get(tag)
            .map(|object| GitRef {
                object: object.clone(),
            })
            .ok_or_else(|| ApiError::NotFound(format!("repos/{}/git/ref/tags/{}", repo, tag)))
    }

    async fn tag_object(&self, repo: &str, sha: &str) -> Result<GitTag> {
        self.tags
            .get(sha)
            .map(|object| GitTag {
                object: object.clone(),
            })
            .ok_or_else(|| ApiError::NotFound(format!("repos/{}/git/tags/{}", repo, sha)))
    }

    async fn combined_status(&self, _repo: &str, sha: &str) -> Result<CombinedStatus> {
        Ok(CombinedStatus {
            statuses: self.statuses.get(sha).cloned().unwrap_or_default(),
        })
    }
}
