use chrono::Utc;
use rocket::{
    request::{FromRequest, Outcome},
    Request, State,
};
use tracing::{info_span, trace, Instrument};

use crate::{classroom::Classroom, errors::WebhookError};

pub mod events;
pub use events::*;

mod signing;
pub use signing::{sign, SignatureAlgorithm, SignedGitHubPayload};

const X_GITHUB_EVENT: &str = "X-GitHub-Event";
const X_GITHUB_DELIVERY: &str = "X-GitHub-Delivery";

pub struct GitHubSecret(pub String);

#[rocket::post("/api/webhooks/github", data = "<payload>")]
pub async fn github_webhook(
    event: GitHubEventType,
    delivery: DeliveryId,
    payload: SignedGitHubPayload,
    classroom: &State<Classroom>,
) -> Result<&'static str, WebhookError> {
    let span = info_span!(
        "webhook",
        delivery = delivery.0.as_deref().unwrap_or("-"),
        event = event.as_str()
    );

    classroom
        .handle(&event, &payload.0, Utc::now())
        .instrument(span)
        .await?;

    Ok("OK")
}

/// Value of the `X-GitHub-Event` header.
///
/// Only events with a handler get their own variant, anything else is kept as
/// [`GitHubEventType::Unsupported`] and rejected once the delivery is authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubEventType {
    Ping,
    Push,
    Release,
    Unsupported(String),
}

impl GitHubEventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ping => "ping",
            Self::Push => "push",
            Self::Release => "release",
            Self::Unsupported(name) => name,
        }
    }
}

impl From<&str> for GitHubEventType {
    fn from(name: &str) -> Self {
        match name {
            "ping" => Self::Ping,
            "push" => Self::Push,
            "release" => Self::Release,
            other => Self::Unsupported(other.to_owned()),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GitHubEventType {
    type Error = WebhookError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let event_types = request.headers().get(X_GITHUB_EVENT).collect::<Vec<_>>();
        if event_types.len() != 1 {
            trace!("request header needs exactly one event type");
            let error = WebhookError::MissingEventType;
            error.log();
            return Outcome::Error((error.status(), error));
        }

        Outcome::Success(GitHubEventType::from(event_types[0]))
    }
}

/// Unique id GitHub gives each delivery, only used for logging.
pub struct DeliveryId(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for DeliveryId {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let delivery = request.headers().get_one(X_GITHUB_DELIVERY);
        Outcome::Success(DeliveryId(delivery.map(str::to_owned)))
    }
}
