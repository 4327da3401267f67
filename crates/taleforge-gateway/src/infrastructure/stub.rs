//! Deterministic stub: canned narration chosen by keyword, never fails.

use async_trait::async_trait;
use serde_json::json;

use crate::domain::error::ProviderError;
use crate::domain::provider::{NarrationProvider, NarrationRequest, ProviderKind};

const RESULT_PREFIX: &str = "- Result: ";

/// Terminal provider of the chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubProvider;

impl StubProvider {
    fn canned(action: &str) -> String {
        let lower = action.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));
        if has(&["character", "profile"]) {
            "As you step into this world, you feel a surge of potential. You stand ready for \
             adventure, your destiny yet to be written."
                .to_owned()
        } else if has(&["attack", "fight", "attacco", "combatto"]) {
            "You lunge forward with determination. Steel rings out and the air grows tense \
             around you."
                .to_owned()
        } else if has(&["look", "examine", "guardo", "esamino"]) {
            "You observe your surroundings carefully: the texture of the stone, the play of \
             light and shadow, the distant sounds of life."
                .to_owned()
        } else {
            format!(
                "The Dungeon Master nods at your action: '{}'. The world shifts slightly in \
                 response, and you feel the weight of your choices.",
                action.trim()
            )
        }
    }

    /// The resolved result line of a ground-truth block, if any.
    fn resolved_result(user_prompt: &str) -> Option<&str> {
        user_prompt
            .lines()
            .find_map(|line| line.trim_start().strip_prefix(RESULT_PREFIX))
            .map(str::trim)
    }
}

#[async_trait]
impl NarrationProvider for StubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::DeterministicStub
    }

    async fn generate(&self, request: &NarrationRequest) -> Result<String, ProviderError> {
        let narration = match Self::resolved_result(&request.user_prompt) {
            Some(result) => format!("The clash of the round settles. {result}"),
            None => Self::canned(&request.player_action),
        };
        let reply = json!({
            "narration": narration,
            "suggested_actions": ["Look around", "Move on carefully", "Rest for a while"],
            "enemy": null,
        });
        Ok(reply.to_string())
    }
}
