//! Strictness levels and violation categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How strict the guard is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterLevel {
    /// Profanity also matched inside longer words.
    Strict,
    /// Whole-word matching of every list.
    #[default]
    Moderate,
    /// Severe profanity only, violence allowed.
    Relaxed,
}

/// A filter level name that is not `strict`, `moderate` or `relaxed`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content filter level: {0}")]
pub struct UnknownFilterLevel(pub String);

impl FromStr for FilterLevel {
    type Err = UnknownFilterLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "moderate" => Ok(Self::Moderate),
            "relaxed" => Ok(Self::Relaxed),
            other => Err(UnknownFilterLevel(other.to_owned())),
        }
    }
}

/// Category of a matched term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    /// Swearing.
    Profanity,
    /// Graphic violence or gore.
    Violence,
    /// Sexual content.
    Sexual,
    /// Slurs.
    HateSpeech,
}

impl ViolationCategory {
    /// Wire name of the category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profanity => "profanity",
            Self::Violence => "violence",
            Self::Sexual => "sexual",
            Self::HateSpeech => "hate_speech",
        }
    }
}

impl fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
