use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::{
    classroom::{deadline, StatusReporter, PUSH_CONTEXT},
    errors::WebhookError,
    store::RepoContext,
    webhooks::github::PushEvent,
};

/// Reports every pushed commit as on time or late, judging them all by `received_at`.
///
/// Statuses are attached one commit at a time: if one fails, the earlier ones stay.
pub async fn handle_push(
    reporter: &StatusReporter<'_>,
    context: &RepoContext,
    event: &PushEvent,
    received_at: DateTime<Utc>,
) -> Result<usize, WebhookError> {
    let commits = match &event.commits {
        Some(commits) if !commits.is_empty() => commits,
        _ => {
            debug!("push to {} has no commits", event.r#ref);
            return Ok(0);
        }
    };

    let state = deadline::evaluate(received_at, context.due_date());
    for commit in commits {
        trace!("commit {} authored at {:?}", commit.id, commit.timestamp);
        reporter.attach(&commit.id, state, PUSH_CONTEXT, "").await?;
    }

    Ok(commits.len())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        github::{testing::RecordingGitHub, StatusState},
        store::{Assignment, GroupAssignment},
        webhooks::github::Commit,
    };

    const REPO: &str = "classroom/linked-lists-student";

    fn push(ids: &[&str]) -> PushEvent {
        PushEvent {
            r#ref: "refs/heads/main".to_string(),
            commits: Some(
                ids.iter()
                    .map(|id| Commit {
                        id: id.to_string(),
                        timestamp: None,
                    })
                    .collect(),
            ),
        }
    }

    fn individual(due_date: Option<DateTime<Utc>>) -> RepoContext {
        RepoContext::Individual(Assignment {
            id: 100,
            title: "Linked lists".to_string(),
            due_date,
        })
    }

    #[rocket::async_test]
    async fn test_commits_in_order() {
        let github = RecordingGitHub::new();
        let reporter = StatusReporter::new(&github, REPO);

        let count = handle_push(&reporter, &individual(None), &push(&["a", "b"]), Utc::now())
            .await
            .unwrap();

        assert_eq!(count, 2);
        let calls = github.calls();
        assert_eq!(
            calls.iter().map(|c| c.sha.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        for call in calls {
            assert_eq!(call.status.state, StatusState::Success);
            assert_eq!(call.status.context, PUSH_CONTEXT);
            assert_eq!(call.status.description, "");
        }
    }

    #[rocket::async_test]
    async fn test_late_push_to_group_repo() {
        let due_date = Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap();
        let context = RepoContext::Group(GroupAssignment {
            id: 200,
            title: "Compiler project".to_string(),
            due_date: Some(due_date),
        });
        let github = RecordingGitHub::new();
        let reporter = StatusReporter::new(&github, REPO);

        handle_push(&reporter, &context, &push(&["a"]), due_date + Duration::minutes(1))
            .await
            .unwrap();

        assert_eq!(github.calls()[0].status.state, StatusState::Failure);
    }

    #[rocket::async_test]
    async fn test_no_commits() {
        let github = RecordingGitHub::new();
        let reporter = StatusReporter::new(&github, REPO);
        let mut event = push(&[]);

        assert_eq!(
            handle_push(&reporter, &individual(None), &event, Utc::now())
                .await
                .unwrap(),
            0
        );

        event.commits = None;
        assert_eq!(
            handle_push(&reporter, &individual(None), &event, Utc::now())
                .await
                .unwrap(),
            0
        );
        assert!(github.calls().is_empty());
    }

    #[rocket::async_test]
    async fn test_partial_failure_is_kept() {
        let mut github = RecordingGitHub::new();
        github.failing_commits.insert("b".to_string());
        let reporter = StatusReporter::new(&github, REPO);

        let result = handle_push(
            &reporter,
            &individual(None),
            &push(&["a", "b", "c"]),
            Utc::now(),
        )
        .await;

        assert!(matches!(result, Err(WebhookError::Upstream(_))));
        let calls = github.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].sha, "a");
    }
}
