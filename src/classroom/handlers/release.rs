use tracing::debug;

use crate::{
    classroom::{deadline, StatusReporter, SUBMISSION_CONTEXT},
    errors::WebhookError,
    github::StatusState,
    store::RepoContext,
    webhooks::github::ReleaseEvent,
};

/// Marks the commit a release points to as the submission, on time if it was pushed before the
/// due date. Every release action does so, as long as the tag still exists.
pub async fn handle_release(
    reporter: &StatusReporter<'_>,
    context: &RepoContext,
    event: &ReleaseEvent,
) -> Result<StatusState, WebhookError> {
    debug!(
        "release {} {} (created at {:?}, published at {:?})",
        event.release.tag_name, event.action, event.release.created_at, event.release.published_at
    );
    let sha = reporter.resolve_tag(&event.release.tag_name).await?;
    let pushed_at = reporter.pushed_at(&sha).await?;
    let state = deadline::evaluate(pushed_at, context.due_date());

    let description = match state {
        StatusState::Success => format!("{} submitted on time", context.title()),
        _ => format!("{} submitted after the due date", context.title()),
    };
    reporter
        .attach(&sha, state, SUBMISSION_CONTEXT, &description)
        .await?;

    Ok(state)
}
