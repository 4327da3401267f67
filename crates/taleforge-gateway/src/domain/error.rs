//! Provider and gateway errors.

use std::fmt::Write as _;

use super::provider::ProviderKind;

/// Failure of a single provider call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider throttled the request (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The reply body had an unexpected shape.
    #[error("unexpected response: {0}")]
    Parse(String),

    /// The provider answered with no text.
    #[error("empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Whether retrying the same provider may help.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Timeout)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Failure of the gateway as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Every provider in the chain failed.
    #[error("all narration providers failed: {}", describe(.failures))]
    ProviderUnavailable {
        /// Each provider's last error, in chain order.
        failures: Vec<(ProviderKind, ProviderError)>,
    },

    /// A provider client could not be constructed.
    #[error("narration provider setup failed: {0}")]
    Setup(String),
}

fn describe(failures: &[(ProviderKind, ProviderError)]) -> String {
    if failures.is_empty() {
        return "no providers configured".to_owned();
    }
    let mut out = String::new();
    for (i, (kind, err)) in failures.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        let _ = write!(out, "{kind}: {err}");
    }
    out
}
