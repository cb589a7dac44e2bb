use std::path::PathBuf;

use anyhow::anyhow;
use serde::Deserialize;
use url::Url;

/// Environment variable holding the webhook secret. Takes precedence over the config file.
pub const WEBHOOK_SECRET_VAR: &str = "WEBHOOK_SECRET";

#[derive(Debug, Clone, Deserialize)]
pub struct ClassroomConfig {
    /// Secret shared with GitHub, used to sign webhook payloads. Usually left out of the file
    /// and provided through `WEBHOOK_SECRET` instead.
    #[serde(default)]
    pub webhook_secret: Option<String>,
    /// Base URL of the GitHub REST API
    #[serde(default = "default_github_api_url")]
    pub github_api_url: Url,
    /// Token used to post commit statuses
    pub github_token: String,
    /// YAML file holding organizations, users, assignments and their repositories.
    pub store_path: PathBuf,
}

fn default_github_api_url() -> Url {
    Url::parse("https://api.github.com").expect("default GitHub API URL is valid")
}

impl ClassroomConfig {
    /// Resolves the webhook secret, preferring the value found in the environment.
    ///
    /// There is no default: a missing secret would make every signature check meaningless.
    pub fn webhook_secret(&self, from_env: Option<String>) -> anyhow::Result<String> {
        from_env
            .filter(|secret| !secret.is_empty())
            .or_else(|| self.webhook_secret.clone())
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "no webhook secret configured, set {} or `webhook_secret`",
                    WEBHOOK_SECRET_VAR
                )
            })
    }
}
