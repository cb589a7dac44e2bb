use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ReleaseEvent {
    #[serde(default)]
    pub action: String,
    pub release: Release,
}

#[derive(Debug, Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}
