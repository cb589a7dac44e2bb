use serde::Deserialize;

/// Sent once when a webhook is created, to check that it is reachable.
#[derive(Debug, Deserialize)]
pub struct PingEvent {
    #[serde(default)]
    pub zen: String,
    pub hook_id: Option<u64>,
}
