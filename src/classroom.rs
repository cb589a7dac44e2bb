use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    errors::WebhookError,
    github::GitHubApi,
    store::Store,
    webhooks::github::{GitHubEvent, GitHubEventType, WebhookEnvelope},
};

mod deadline;

mod handlers;
use handlers::{handle_ping, handle_push, handle_release};

mod resolver;
use resolver::{resolve, Resolved, ResolvedRepo};

mod status;
pub use status::{StatusReporter, PUSH_CONTEXT, SUBMISSION_CONTEXT};

/// Applies authenticated webhook deliveries to the classroom.
pub struct Classroom {
    store: Arc<dyn Store>,
    github: Arc<dyn GitHubApi>,
}

impl Classroom {
    pub fn new(store: Arc<dyn Store>, github: Arc<dyn GitHubApi>) -> Self {
        Self { store, github }
    }

    /// Handles one delivery whose signature was already checked.
    ///
    /// Nothing is written before the organization, sender and (except for pings) repository of
    /// the delivery are known.
    pub async fn handle(
        &self,
        event_type: &GitHubEventType,
        payload: &[u8],
        received_at: DateTime<Utc>,
    ) -> Result<(), WebhookError> {
        let envelope = WebhookEnvelope::parse(payload)?;
        let resolved = resolve(self.store.as_ref(), &envelope, event_type).await?;
        let event = GitHubEvent::parse(event_type, payload)?;
        debug!(
            "handling {} event sent by user {}",
            event_type.as_str(),
            resolved.sender.uid
        );

        match event {
            GitHubEvent::Ping(event) => {
                debug!("ping from hook {:?}: {}", event.hook_id, event.zen);
                handle_ping(self.store.as_ref(), &resolved.organization).await?;
            }
            GitHubEvent::Push(event) => {
                let repo = submission_repo(&resolved, &envelope)?;
                let reporter = StatusReporter::new(self.github.as_ref(), &repo.full_name);
                handle_push(&reporter, &repo.context, &event, received_at).await?;
            }
            GitHubEvent::Release(event) => {
                let repo = submission_repo(&resolved, &envelope)?;
                let reporter = StatusReporter::new(self.github.as_ref(), &repo.full_name);
                handle_release(&reporter, &repo.context, &event).await?;
            }
        }

        Ok(())
    }
}

// only pings are resolved without a repository
fn submission_repo<'a>(
    resolved: &'a Resolved,
    envelope: &WebhookEnvelope,
) -> Result<&'a ResolvedRepo, WebhookError> {
    resolved
        .repo
        .as_ref()
        .ok_or_else(|| WebhookError::UnknownRepository(envelope.repository_id()))
}
