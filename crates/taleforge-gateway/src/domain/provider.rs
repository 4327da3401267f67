//! The provider abstraction.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ProviderError;

/// Provider variants, in their default priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Local inference server (Ollama).
    LocalInference,
    /// Primary cloud model (Gemini).
    CloudPrimary,
    /// Secondary cloud model (Groq, OpenAI-compatible).
    CloudSecondary,
    /// Tertiary cloud model (OpenAI).
    CloudTertiary,
    /// Canned narration; never fails.
    DeterministicStub,
}

impl ProviderKind {
    /// Short configuration name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LocalInference => "local",
            Self::CloudPrimary => "primary",
            Self::CloudSecondary => "secondary",
            Self::CloudTertiary => "tertiary",
            Self::DeterministicStub => "stub",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider name that is not one of the configured variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown narration provider: {0}")]
pub struct UnknownProviderKind(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProviderKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::LocalInference),
            "primary" => Ok(Self::CloudPrimary),
            "secondary" => Ok(Self::CloudSecondary),
            "tertiary" => Ok(Self::CloudTertiary),
            "stub" => Ok(Self::DeterministicStub),
            other => Err(UnknownProviderKind(other.to_owned())),
        }
    }
}

/// One narration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationRequest {
    /// Persona and rules.
    pub system_prompt: String,
    /// Context, directive, action and reply contract.
    pub user_prompt: String,
    /// The player's action as typed.
    pub player_action: String,
}

/// A text-generation backend.
#[async_trait]
pub trait NarrationProvider: Send + Sync {
    /// Which variant this provider is.
    fn kind(&self) -> ProviderKind;

    /// Generates narration for `request`.
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` describing why no text was produced.
    async fn generate(&self, request: &NarrationRequest) -> Result<String, ProviderError>;
}
