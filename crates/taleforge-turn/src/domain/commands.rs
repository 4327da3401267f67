//! Commands for the Turn context.

use taleforge_rules::domain::action::PlayerActionKind;
use uuid::Uuid;

/// Longest accepted action, in characters.
pub const MAX_ACTION_CHARS: usize = 500;

/// Command to resolve one turn for a character.
#[derive(Debug, Clone)]
pub struct TakeTurn {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Acting character.
    pub character_id: Uuid,
    /// Free-text action.
    pub action: String,
    /// Narration language tag, e.g. `en` or `it`.
    pub language: String,
    /// Explicit combat action; free text is classified when absent.
    pub combat_action: Option<PlayerActionKind>,
}
