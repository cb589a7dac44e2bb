//! Errors raised while handling a webhook delivery.
//!
//! Every rejection is answered with the same `404 Not Found`, whatever its cause, so a caller
//! can't tell a bad signature from an unknown organization. The cause is only visible in logs.

use std::io;

use rocket::{
    http::Status,
    response::{self, Responder},
    Request,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::{github::ApiError, store::StoreError};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing or repeated signature header")]
    MissingSignature,
    #[error("payload signature doesn't match")]
    InvalidSignature,
    #[error("couldn't read payload: {0}")]
    UnreadablePayload(#[from] io::Error),
    #[error("payload exceeds the size limit")]
    PayloadTooLarge,
    #[error("webhook secret isn't configured")]
    SecretNotConfigured,

    #[error("unknown organization {0:?}")]
    UnknownOrganization(Option<u64>),
    #[error("unknown sender {0:?}")]
    UnknownSender(Option<u64>),
    #[error("repository {0:?} doesn't belong to any assignment")]
    UnknownRepository(Option<u64>),

    #[error("missing or repeated event type header")]
    MissingEventType,
    #[error("no handler for event `{0}`")]
    UnsupportedEvent(String),

    #[error("payload isn't JSON (content type: {0:?})")]
    NotJson(Option<String>),
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("commit {sha} has no `{context}` status")]
    MissingPriorStatus { sha: String, context: &'static str },
    #[error("repository {github_repo_id} refers to missing assignment {assignment_id}")]
    DanglingAssignment {
        github_repo_id: u64,
        assignment_id: u64,
    },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("GitHub API error: {0}")]
    Upstream(#[from] ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Resolution,
    UnsupportedEvent,
    MalformedPayload,
    Upstream,
    Internal,
}

impl ErrorCategory {
    /// Whether the error is a rejection of the delivery rather than a failure to process it.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Authentication | Self::Resolution | Self::UnsupportedEvent | Self::MalformedPayload
        )
    }
}

impl WebhookError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingSignature
            | Self::InvalidSignature
            | Self::UnreadablePayload(_)
            | Self::PayloadTooLarge => ErrorCategory::Authentication,
            Self::UnknownOrganization(_) | Self::UnknownSender(_) | Self::UnknownRepository(_) => {
                ErrorCategory::Resolution
            }
            Self::MissingEventType | Self::UnsupportedEvent(_) => ErrorCategory::UnsupportedEvent,
            Self::NotJson(_) | Self::InvalidPayload(_) => ErrorCategory::MalformedPayload,
            Self::Upstream(_) => ErrorCategory::Upstream,
            Self::SecretNotConfigured
            | Self::MissingPriorStatus { .. }
            | Self::DanglingAssignment { .. }
            | Self::Store(_) => ErrorCategory::Internal,
        }
    }

    /// Status sent back to GitHub.
    pub fn status(&self) -> Status {
        if self.category().is_rejection() {
            Status::NotFound
        } else {
            Status::InternalServerError
        }
    }

    /// Logs the cause with its category, the only place where rejections can be told apart.
    pub fn log(&self) {
        let category = self.category();
        if category.is_rejection() {
            warn!(?category, "rejected webhook delivery: {}", self);
        } else {
            error!(?category, "failed to handle webhook delivery: {}", self);
        }
    }
}

impl<'r> Responder<'r, 'static> for WebhookError {
    fn respond_to(self, _request: &'r Request<'_>) -> response::Result<'static> {
        self.log();
        Err(self.status())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::testing::CapturedLogs;

    #[test]
    fn test_log_levels_follow_category() {
        let logs = CapturedLogs::default();
        tracing::subscriber::with_default(logs.subscriber(), || {
            WebhookError::InvalidSignature.log();
            WebhookError::SecretNotConfigured.log();
        });

        let contents = logs.contents();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2, "{}", contents);
        assert!(lines[0].contains("WARN"), "{}", lines[0]);
        assert!(lines[0].contains("category=Authentication"), "{}", lines[0]);
        assert!(lines[1].contains("ERROR"), "{}", lines[1]);
        assert!(lines[1].contains("category=Internal"), "{}", lines[1]);
    }

    #[test]
    fn test_rejections_are_indistinguishable() {
        let rejections = [
            WebhookError::MissingSignature,
            WebhookError::InvalidSignature,
            WebhookError::PayloadTooLarge,
            WebhookError::UnknownOrganization(Some(1)),
            WebhookError::UnknownSender(None),
            WebhookError::UnknownRepository(Some(3)),
            WebhookError::MissingEventType,
            WebhookError::UnsupportedEvent("issues".to_string()),
            WebhookError::NotJson(None),
        ];

        for error in rejections {
            assert_eq!(error.status(), Status::NotFound, "{}", error);
        }
    }

    #[test]
    fn test_categories_stay_distinct() {
        assert_eq!(
            WebhookError::InvalidSignature.category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            WebhookError::UnknownOrganization(None).category(),
            ErrorCategory::Resolution
        );
        assert_eq!(
            WebhookError::UnsupportedEvent("issues".to_string()).category(),
            ErrorCategory::UnsupportedEvent
        );
        assert_eq!(
            WebhookError::Upstream(ApiError::NotFound("repos/a/b".to_string())).category(),
            ErrorCategory::Upstream
        );
    }

    #[test]
    fn test_failures_are_server_errors() {
        let failures = [
            WebhookError::Upstream(ApiError::NotFound("repos/a/b/git/ref/tags/v1".to_string())),
            WebhookError::MissingPriorStatus {
                sha: "deadbeef".to_string(),
                context: "classroom/push",
            },
            WebhookError::DanglingAssignment {
                github_repo_id: 1,
                assignment_id: 2,
            },
            WebhookError::SecretNotConfigured,
        ];

        for error in failures {
            assert_eq!(error.status(), Status::InternalServerError, "{}", error);
        }
    }
}
