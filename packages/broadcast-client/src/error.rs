//! Error types for the broadcast client.
//!
//! Every failure the client can surface is one of these kinds, and each kind
//! maps to exactly one corrective action for the operator ([`ClientError::advice`]).
//! Transport-level faults are retried inside [`crate::transport::Transport`]
//! and only escalate once the retry budget is exhausted; the other kinds are
//! surfaced immediately because retrying them cannot succeed.

use std::time::Duration;

use thiserror::Error;

/// Result type for broadcast client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Broadcast client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client-detected bad input; no network I/O was performed.
    #[error("validation failed: {0}")]
    Validation(&'static str),

    /// The admin token was missing or rejected (HTTP 401).
    #[error("admin token missing or rejected")]
    Auth,

    /// The target account is not logged in (HTTP 403 with
    /// `session_not_authorized`).
    #[error("account session not authorized")]
    Permission,

    /// The server is load-shedding or deduplicated the request (HTTP 429).
    /// Callers must not retry automatically.
    #[error("rate limited or duplicate request")]
    RateLimited,

    /// An attempt (or the whole poll loop) exceeded its time budget.
    #[error("timed out after {waited:?}")]
    Timeout { waited: Duration },

    /// Any other non-2xx response once retries are exhausted.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Connection-level failure or unparseable response body.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ClientError {
    /// One actionable message per error kind, for operator-facing display.
    pub fn advice(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "fix the input and try again",
            ClientError::Auth => "save a valid admin token first",
            ClientError::Permission => "log the account in before sending",
            ClientError::RateLimited => "wait a moment; the request was throttled or already accepted",
            ClientError::Timeout { .. } => {
                "the request timed out; the server may still be sending in the background"
            }
            ClientError::Api { .. } | ClientError::Network(_) => "try again later",
        }
    }

    /// True for the kinds that count as transport failures: the ones the
    /// transport retries locally before surfacing.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout { .. } | ClientError::Api { .. } | ClientError::Network(_)
        )
    }
}
