use hmac::{digest::KeyInit, Hmac, Mac};
use rocket::{
    data::{ByteUnit, FromData, Outcome},
    http::ContentType,
    Data, Request,
};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use tracing::trace;

use crate::{errors::WebhookError, webhooks::github::GitHubSecret};

const X_HUB_SIGNATURE_256: &str = "X-Hub-Signature-256";
// legacy header, still sent alongside the SHA-256 one
const X_HUB_SIGNATURE: &str = "X-Hub-Signature";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl SignatureAlgorithm {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            "sha384" => Some(Self::Sha384),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    fn verify(&self, secret: &[u8], data: &[u8], expected: &[u8]) -> bool {
        match self {
            Self::Sha1 => verify_mac::<Hmac<Sha1>>(secret, data, expected),
            Self::Sha256 => verify_mac::<Hmac<Sha256>>(secret, data, expected),
            Self::Sha384 => verify_mac::<Hmac<Sha384>>(secret, data, expected),
            Self::Sha512 => verify_mac::<Hmac<Sha512>>(secret, data, expected),
        }
    }

    fn compute(&self, secret: &[u8], data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => compute_mac::<Hmac<Sha1>>(secret, data),
            Self::Sha256 => compute_mac::<Hmac<Sha256>>(secret, data),
            Self::Sha384 => compute_mac::<Hmac<Sha384>>(secret, data),
            Self::Sha512 => compute_mac::<Hmac<Sha512>>(secret, data),
        }
    }
}

fn verify_mac<M: Mac + KeyInit>(secret: &[u8], data: &[u8], expected: &[u8]) -> bool {
    let mut mac = match <M as KeyInit>::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(data);

    // constant time
    mac.verify_slice(expected).is_ok()
}

fn compute_mac<M: Mac + KeyInit>(secret: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = <M as KeyInit>::new_from_slice(secret).expect("HMAC accepts keys of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Signs `data` the way GitHub does, returning a `<algorithm>=<hex digest>` header value.
pub fn sign(algorithm: SignatureAlgorithm, secret: &[u8], data: &[u8]) -> String {
    format!(
        "{}={}",
        algorithm.name(),
        hex::encode(algorithm.compute(secret, data))
    )
}

/// Checks a `<algorithm>=<hex digest>` signature of `data`.
///
/// Malformed headers and unknown algorithms never match.
pub fn validate_signature(secret: &[u8], signature: &str, data: &[u8]) -> bool {
    trace!("validating signature...");

    let (algorithm, digest) = match signature.split_once('=') {
        Some((algorithm, digest)) if !digest.contains('=') => (algorithm, digest),
        _ => {
            trace!("signature `{}` isn't of the form algorithm=digest", signature);
            return false;
        }
    };

    let algorithm = match SignatureAlgorithm::from_name(algorithm) {
        Some(algorithm) => algorithm,
        None => {
            trace!("unsupported signature algorithm `{}`", algorithm);
            return false;
        }
    };

    // digests are rendered in lowercase hex
    if digest.bytes().any(|b| b.is_ascii_uppercase()) {
        trace!("signature digest isn't lowercase hex");
        return false;
    }

    match hex::decode(digest) {
        Ok(bytes) => algorithm.verify(secret, data, &bytes),
        Err(_) => {
            trace!("couldn't decode hex-encoded signature {}", digest);
            false
        }
    }
}

/// Picks the strongest signature header GitHub sent. Each header may appear at most once.
fn signature_header<'r>(request: &'r Request<'_>) -> Option<&'r str> {
    for name in [X_HUB_SIGNATURE_256, X_HUB_SIGNATURE] {
        let values = request.headers().get(name).collect::<Vec<_>>();
        match values.len() {
            0 => continue,
            1 => return Some(values[0]),
            _ => {
                trace!("found {} {} headers", values.len(), name);
                return None;
            }
        }
    }

    trace!("couldn't locate any signature header");
    None
}

/// Raw request body whose signature has been checked against the webhook secret.
pub struct SignedGitHubPayload(pub Vec<u8>);

const LIMIT: ByteUnit = ByteUnit::Mebibyte(1);

#[rocket::async_trait]
impl<'r> FromData<'r> for SignedGitHubPayload {
    type Error = WebhookError;

    async fn from_data(request: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        trace!("received payload on GitHub webhook endpoint: {:?}", request);

        if request.content_type() != Some(&ContentType::JSON) {
            trace!(
                "content type `{:?}` wasn't json, stopping here...",
                request.content_type()
            );
            let content_type = request.content_type().map(|ct| ct.to_string());
            return reject(WebhookError::NotJson(content_type));
        }

        let signature = match signature_header(request) {
            Some(signature) => signature,
            None => return reject(WebhookError::MissingSignature),
        };

        let secret = match request.rocket().state::<GitHubSecret>() {
            Some(secret) => secret,
            None => return reject(WebhookError::SecretNotConfigured),
        };

        let size_limit = request.limits().get("json").unwrap_or(LIMIT);
        let content = match data.open(size_limit).into_bytes().await {
            Ok(bytes) if bytes.is_complete() => bytes.into_inner(),
            Ok(_) => {
                trace!("payload was too big");
                return reject(WebhookError::PayloadTooLarge);
            }
            Err(e) => return reject(e.into()),
        };

        if !validate_signature(secret.0.as_bytes(), signature, &content) {
            trace!("signature validation failed, stopping here...");
            return reject(WebhookError::InvalidSignature);
        }

        trace!("validated GitHub payload");
        Outcome::Success(SignedGitHubPayload(content))
    }
}

fn reject<'r>(error: WebhookError) -> Outcome<'r, SignedGitHubPayload> {
    error.log();
    Outcome::Error((error.status(), error))
}
