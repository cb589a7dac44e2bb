use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client, RequestBuilder, Response, StatusCode,
};
use serde::Serialize;
use url::Url;

use crate::github::{
    ApiError, CombinedStatus, CommitStatus, GitHubApi, GitRef, GitTag, Result,
};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
// GitHub rejects longer descriptions
const MAX_STATUS_DESCRIPTION_LEN: usize = 140;

/// GitHub REST API client authenticated with a single token.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: Url,
}

impl GitHubClient {
    pub fn new(api_url: Url, token: &str) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, authorization);
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, api_url })
    }

    /// URL of `repos/<owner>/<name>/<path...>` under the API root.
    ///
    /// Each segment is percent-encoded on its own, so tag names holding `#`, `?` or `%` can't
    /// leak into the query or fragment. Slashes in `repo` and tag names still separate segments.
    fn repo_url<'s>(
        &self,
        repo: &'s str,
        path: impl IntoIterator<Item = &'s str>,
    ) -> Result<Url> {
        // `Url::join` would drop the last segment of GitHub Enterprise URLs like `.../api/v3`
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl(self.api_url.clone()))?
            .pop_if_empty()
            .push("repos")
            .extend(repo.split('/'))
            .extend(path);

        Ok(url)
    }

    fn tag_ref_url(&self, repo: &str, tag: &str) -> Result<Url> {
        self.repo_url(repo, ["git", "ref", "tags"].into_iter().chain(tag.split('/')))
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response> {
        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.path().to_owned()));
        }

        Ok(response.error_for_status()?)
    }
}

#[rocket::async_trait]
impl GitHubApi for GitHubClient {
    #[tracing::instrument(skip(self, status), fields(state = %status.state, context = %status.context))]
    async fn create_commit_status(
        &self,
        repo: &str,
        sha: &str,
        status: &CommitStatus,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct Request<'a> {
            state: &'a str,
            context: &'a str,
            description: String,
        }

        let url = self.repo_url(repo, ["statuses", sha])?;
        let request = self.client.post(url.clone()).json(&Request {
            state: status.state.as_str(),
            context: &status.context,
            description: status
                .description
                .chars()
                .take(MAX_STATUS_DESCRIPTION_LEN)
                .collect(),
        });
        self.send(request, &url).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn tag_ref(&self, repo: &str, tag: &str) -> Result<GitRef> {
        let url = self.tag_ref_url(repo, tag)?;
        let request = self.client.get(url.clone());

        Ok(self.send(request, &url).await?.json().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn tag_object(&self, repo: &str, sha: &str) -> Result<GitTag> {
        let url = self.repo_url(repo, ["git", "tags", sha])?;
        let request = self.client.get(url.clone());

        Ok(self.send(request, &url).await?.json().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn combined_status(&self, repo: &str, sha: &str) -> Result<CombinedStatus> {
        let url = self.repo_url(repo, ["commits", sha, "status"])?;
        let request = self.client.get(url.clone());

        Ok(self.send(request, &url).await?.json().await?)
    }
}
