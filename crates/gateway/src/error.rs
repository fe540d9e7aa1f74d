use thiserror::Error;

/// Errors raised by the push-gateway client.
///
/// Per-token delivery failures are NOT errors — they are reported as failed
/// outcomes inside a `MulticastReport`. These variants cover failures that
/// prevent any send from happening at all.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("OAuth token exchange failed: {0}")]
    Oauth(String),
}
