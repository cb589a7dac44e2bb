use tracing::{debug, info};

use crate::{
    errors::WebhookError,
    store::{Organization, Store},
};

/// Marks the organization's webhook as active. Returns whether anything changed.
pub async fn handle_ping(
    store: &dyn Store,
    organization: &Organization,
) -> Result<bool, WebhookError> {
    if organization.webhook_active {
        debug!(
            "webhook of organization {} is already active",
            organization.github_id
        );
        return Ok(false);
    }

    store
        .set_webhook_active(organization.github_id, true)
        .await?;
    info!("activated webhook of organization {}", organization.github_id);

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreSnapshot};

    #[rocket::async_test]
    async fn test_ping_is_idempotent() {
        let store = MemoryStore::from_snapshot(StoreSnapshot {
            organizations: vec![Organization {
                github_id: 1,
                webhook_active: false,
            }],
            ..Default::default()
        });

        let organization = store.organization_by_github_id(1).await.unwrap().unwrap();
        assert!(handle_ping(&store, &organization).await.unwrap());
        let organization = store.organization_by_github_id(1).await.unwrap().unwrap();
        assert!(organization.webhook_active);

        assert!(!handle_ping(&store, &organization).await.unwrap());
        let organization = store.organization_by_github_id(1).await.unwrap().unwrap();
        assert!(organization.webhook_active);
    }
}
