use serde::Deserialize;

use crate::{errors::WebhookError, webhooks::github::GitHubEventType};

mod ping;
mod push;
mod release;

pub use ping::*;
pub use push::*;
pub use release::*;

#[derive(Debug)]
pub enum GitHubEvent {
    Ping(PingEvent),
    Push(PushEvent),
    Release(ReleaseEvent),
}

impl GitHubEvent {
    /// Parses the payload of a supported event.
    pub fn parse(event_type: &GitHubEventType, payload: &[u8]) -> Result<Self, WebhookError> {
        let event = match event_type {
            GitHubEventType::Ping => Self::Ping(serde_json::from_slice(payload)?),
            GitHubEventType::Push => Self::Push(serde_json::from_slice(payload)?),
            GitHubEventType::Release => Self::Release(serde_json::from_slice(payload)?),
            GitHubEventType::Unsupported(name) => {
                return Err(WebhookError::UnsupportedEvent(name.clone()))
            }
        };

        Ok(event)
    }
}

/// Fields shared by every event, used to find the records a delivery is about.
///
/// They are all optional here: a payload missing one of them is rejected like one pointing to an
/// unknown record.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    pub organization: Option<GitHubAccount>,
    pub sender: Option<GitHubAccount>,
    pub repository: Option<Repository>,
}

impl WebhookEnvelope {
    pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
        Ok(serde_json::from_slice(payload)?)
    }

    pub fn organization_id(&self) -> Option<u64> {
        self.organization.as_ref().map(|o| o.id)
    }

    pub fn sender_id(&self) -> Option<u64> {
        self.sender.as_ref().map(|s| s.id)
    }

    pub fn repository_id(&self) -> Option<u64> {
        self.repository.as_ref().map(|r| r.id)
    }
}

/// A user or an organization.
#[derive(Debug, Deserialize)]
pub struct GitHubAccount {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub full_name: String,
}
