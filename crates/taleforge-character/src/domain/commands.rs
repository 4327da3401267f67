//! Commands for the Character context.

use uuid::Uuid;

use super::sheet::CoreStats;

/// Command to create a new character.
#[derive(Debug, Clone)]
pub struct CreateCharacter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Identifier of the new character.
    pub character_id: Uuid,
    /// Story the character joins.
    pub story_id: Uuid,
    /// The character's name.
    pub name: String,
    /// Optional class or profession.
    pub profession: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Starting stats.
    pub stats: CoreStats,
    /// Starting (and maximum) hit points.
    pub max_hp: i32,
}
