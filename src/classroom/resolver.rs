use tracing::trace;

use crate::{
    errors::WebhookError,
    store::{Organization, RepoContext, Store, User},
    webhooks::github::{GitHubEventType, WebhookEnvelope},
};

/// Records a delivery refers to.
#[derive(Debug)]
pub struct Resolved {
    pub organization: Organization,
    /// Only checked for existence.
    pub sender: User,
    /// Absent for pings, which aren't about a repository.
    pub repo: Option<ResolvedRepo>,
}

#[derive(Debug)]
pub struct ResolvedRepo {
    /// `owner/name` of the repository on GitHub
    pub full_name: String,
    pub context: RepoContext,
}

/// Looks up the organization, sender and repository of a delivery, in that order, stopping at
/// the first one that doesn't exist.
pub async fn resolve(
    store: &dyn Store,
    envelope: &WebhookEnvelope,
    event_type: &GitHubEventType,
) -> Result<Resolved, WebhookError> {
    let organization_id = envelope.organization_id();
    let organization = match organization_id {
        Some(id) => store.organization_by_github_id(id).await?,
        None => None,
    }
    .ok_or(WebhookError::UnknownOrganization(organization_id))?;

    let sender_id = envelope.sender_id();
    let sender = match sender_id {
        Some(id) => store.user_by_uid(id).await?,
        None => None,
    }
    .ok_or(WebhookError::UnknownSender(sender_id))?;

    if *event_type == GitHubEventType::Ping {
        trace!("ping events don't need a repository");
        return Ok(Resolved {
            organization,
            sender,
            repo: None,
        });
    }

    let repository = envelope
        .repository
        .as_ref()
        .ok_or(WebhookError::UnknownRepository(None))?;
    let context = repo_context(store, repository.id)
        .await?
        .ok_or(WebhookError::UnknownRepository(Some(repository.id)))?;

    Ok(Resolved {
        organization,
        sender,
        repo: Some(ResolvedRepo {
            full_name: repository.full_name.clone(),
            context,
        }),
    })
}

/// Finds the assignment owning a repository, looking at individual repositories first.
pub async fn repo_context(
    store: &dyn Store,
    github_repo_id: u64,
) -> Result<Option<RepoContext>, WebhookError> {
    if let Some(repo) = store.assignment_repo_by_github_id(github_repo_id).await? {
        let assignment = store.assignment(repo.assignment_id).await?.ok_or(
            WebhookError::DanglingAssignment {
                github_repo_id,
                assignment_id: repo.assignment_id,
            },
        )?;
        return Ok(Some(RepoContext::Individual(assignment)));
    }

    if let Some(repo) = store
        .group_assignment_repo_by_github_id(github_repo_id)
        .await?
    {
        let assignment = store.group_assignment(repo.group_assignment_id).await?.ok_or(
            WebhookError::DanglingAssignment {
                github_repo_id,
                assignment_id: repo.group_assignment_id,
            },
        )?;
        return Ok(Some(RepoContext::Group(assignment)));
    }

    Ok(None)
}
