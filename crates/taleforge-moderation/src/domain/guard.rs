//! Content Guard.

use taleforge_core::error::DomainError;
use tracing::warn;

use super::policy::{FilterLevel, ViolationCategory};
use super::terms::{
    HATE_SPEECH, PROFANITY, SEVERE_PROFANITY, SEXUAL, VIOLENCE, contains_phrase, normalize,
    redact_substring, redact_word,
};

/// Marker replacing redacted terms.
pub const REDACTION_MARKER: &str = "[FILTERED]";

/// Profanity terms longer than this are also matched inside words in strict mode.
const STRICT_SUBSTRING_MIN_LEN: usize = 4;

/// Result of checking a player action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputVerdict {
    /// True when nothing matched.
    pub ok: bool,
    /// Matched categories, in check order, without duplicates.
    pub violations: Vec<ViolationCategory>,
}

impl InputVerdict {
    /// Player-facing rejection message.
    #[must_use]
    pub fn message(&self) -> String {
        let categories: Vec<&str> = self.violations.iter().map(|c| c.as_str()).collect();
        format!(
            "Your input contains inappropriate content: {}. Please rephrase your action.",
            categories.join(", ")
        )
    }

    /// `Ok(())` when accepted, otherwise `DomainError::ContentRejected`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ContentRejected` listing the matched categories.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.ok {
            return Ok(());
        }
        Err(DomainError::ContentRejected {
            message: self.message(),
            categories: self
                .violations
                .iter()
                .map(|c| c.as_str().to_owned())
                .collect(),
        })
    }
}

/// Narration after redaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedOutput {
    /// Redacted text.
    pub text: String,
    /// Whether anything was replaced.
    pub was_modified: bool,
}

/// Input/output moderation at a fixed strictness.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentGuard {
    level: FilterLevel,
}

impl ContentGuard {
    /// A guard at `level`.
    #[must_use]
    pub fn new(level: FilterLevel) -> Self {
        Self { level }
    }

    /// The configured strictness.
    #[must_use]
    pub fn level(&self) -> FilterLevel {
        self.level
    }

    fn profanity_terms(&self) -> &'static [&'static str] {
        match self.level {
            FilterLevel::Relaxed => SEVERE_PROFANITY,
            FilterLevel::Strict | FilterLevel::Moderate => PROFANITY,
        }
    }

    fn matches_inside_words(&self, term: &str) -> bool {
        self.level == FilterLevel::Strict && term.len() >= STRICT_SUBSTRING_MIN_LEN
    }

    fn profanity_matches(&self, normalized: &str) -> Vec<&'static str> {
        self.profanity_terms()
            .iter()
            .copied()
            .filter(|term| {
                contains_phrase(normalized, term)
                    || (self.matches_inside_words(term) && normalized.contains(term))
            })
            .collect()
    }

    fn matches(normalized: &str, terms: &'static [&'static str]) -> Vec<&'static str> {
        terms
            .iter()
            .copied()
            .filter(|term| contains_phrase(normalized, term))
            .collect()
    }

    /// Checks a player action against every category the level enables.
    #[must_use]
    pub fn validate_input(&self, text: &str) -> InputVerdict {
        let normalized = normalize(text);
        let mut violations = Vec::new();

        if !self.profanity_matches(&normalized).is_empty() {
            violations.push(ViolationCategory::Profanity);
        }
        if self.level != FilterLevel::Relaxed && !Self::matches(&normalized, VIOLENCE).is_empty() {
            violations.push(ViolationCategory::Violence);
        }
        if !Self::matches(&normalized, SEXUAL).is_empty() {
            violations.push(ViolationCategory::Sexual);
        }
        if !Self::matches(&normalized, HATE_SPEECH).is_empty() {
            violations.push(ViolationCategory::HateSpeech);
        }

        if !violations.is_empty() {
            warn!(?violations, level = ?self.level, "player input rejected by content guard");
        }
        InputVerdict {
            ok: violations.is_empty(),
            violations,
        }
    }

    /// Redacts profanity, sexual and hate-speech terms from narration.
    #[must_use]
    pub fn sanitize_output(&self, text: &str) -> SanitizedOutput {
        let normalized = normalize(text);
        let profanity = self.profanity_matches(&normalized);
        let mut words = Self::matches(&normalized, SEXUAL);
        words.extend(Self::matches(&normalized, HATE_SPEECH));

        let mut sanitized = text.to_owned();
        for term in &profanity {
            sanitized = if self.matches_inside_words(term) {
                redact_substring(&sanitized, term, REDACTION_MARKER)
            } else {
                redact_word(&sanitized, term, REDACTION_MARKER)
            };
        }
        for term in &words {
            sanitized = redact_word(&sanitized, term, REDACTION_MARKER);
        }
        let terms = profanity.len() + words.len();

        let was_modified = sanitized != text;
        if was_modified {
            warn!(terms, "narration redacted by content guard");
        }
        SanitizedOutput {
            text: sanitized,
            was_modified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_action_is_accepted() {
        let guard = ContentGuard::new(FilterLevel::Moderate);

        let verdict = guard.validate_input("I attack the goblin and look for shelter");

        assert!(verdict.ok);
        assert!(verdict.violations.is_empty());
        assert!(verdict.into_result().is_ok());
    }

    #[test]
    fn test_violations_are_categorised_in_order() {
        let guard = ContentGuard::new(FilterLevel::Moderate);

        let verdict = guard.validate_input("Damn it, I decapitate the guard!");

        assert!(!verdict.ok);
        assert_eq!(
            verdict.violations,
            vec![ViolationCategory::Profanity, ViolationCategory::Violence]
        );
        assert_eq!(
            verdict.message(),
            "Your input contains inappropriate content: profanity, violence. Please rephrase your action."
        );
    }

    #[test]
    fn test_rejection_maps_to_content_rejected() {
        let guard = ContentGuard::new(FilterLevel::Moderate);

        let result = guard.validate_input("a blood bath").into_result();

        match result.unwrap_err() {
            DomainError::ContentRejected { categories, message } => {
                assert_eq!(categories, vec!["violence".to_owned()]);
                assert!(message.contains("violence"));
            }
            other => panic!("expected ContentRejected, got {other:?}"),
        }
    }

    #[test]
    fn test_relaxed_allows_violence_and_mild_profanity() {
        let guard = ContentGuard::new(FilterLevel::Relaxed);

        assert!(guard.validate_input("Damn, I behead the troll").ok);
        assert!(!guard.validate_input("shit").ok);
    }

    #[test]
    fn test_strict_matches_profanity_inside_words() {
        let strict = ContentGuard::new(FilterLevel::Strict);
        let moderate = ContentGuard::new(FilterLevel::Moderate);

        assert!(!strict.validate_input("bitchy remark").ok);
        assert!(moderate.validate_input("bitchy remark").ok);
        assert!(strict.validate_input("I pass the classroom").ok);
        assert!(!strict.validate_input("a shell on the beach").ok);
    }

    #[test]
    fn test_word_boundaries_avoid_false_positives() {
        let guard = ContentGuard::new(FilterLevel::Moderate);

        assert!(guard.validate_input("I pass the class and say hello").ok);
    }

    #[test]
    fn test_sanitize_output_redacts_case_insensitively() {
        let guard = ContentGuard::new(FilterLevel::Moderate);

        let output = guard.sanitize_output("The orc shouts: DAMN you! Then it flees.");

        assert_eq!(output.text, "The orc shouts: [FILTERED] you! Then it flees.");
        assert!(output.was_modified);
    }

    #[test]
    fn test_strict_sanitize_redacts_profanity_inside_words() {
        let strict = ContentGuard::new(FilterLevel::Strict);

        let output = strict.sanitize_output("The FUCKING goblin snarls.");

        assert!(output.was_modified);
        assert_eq!(output.text, "The [FILTERED]ING goblin snarls.");
    }

    #[test]
    fn test_moderate_sanitize_keeps_profanity_inside_words() {
        let moderate = ContentGuard::new(FilterLevel::Moderate);

        let output = moderate.sanitize_output("The fucking goblin snarls.");

        assert!(!output.was_modified);
    }

    #[test]
    fn test_sanitize_output_leaves_violence_and_clean_text() {
        let guard = ContentGuard::new(FilterLevel::Moderate);

        let output = guard.sanitize_output("The carnage of the battle fades.");

        assert_eq!(output.text, "The carnage of the battle fades.");
        assert!(!output.was_modified);
    }
}
