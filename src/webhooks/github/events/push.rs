use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PushEvent {
    #[serde(default)]
    pub r#ref: String,
    pub commits: Option<Vec<Commit>>,
}

#[derive(Debug, Deserialize)]
pub struct Commit {
    pub id: String,
    pub timestamp: Option<DateTime<Utc>>,
}
