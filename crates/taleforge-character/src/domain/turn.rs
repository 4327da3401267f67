//! Immutable turn records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a combat round ended for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatOutcome {
    /// Both sides are still standing.
    Ongoing,
    /// The enemy was defeated.
    Victory,
    /// The player escaped.
    Fled,
    /// The player fell and was resurrected.
    Resurrected,
    /// The player fell for good.
    PermanentDeath,
}

/// Structured record of the combat round played during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSummary {
    /// Enemy fought.
    pub enemy_name: String,
    /// Result of the round.
    pub outcome: CombatOutcome,
    /// Ordered, human-readable log lines.
    pub log: Vec<String>,
    /// Player hit points before the round.
    pub player_hp_before: i32,
    /// Player hit points after the round.
    pub player_hp_after: i32,
    /// Enemy hit points before the round.
    pub enemy_hp_before: i32,
    /// Enemy hit points after the round.
    pub enemy_hp_after: i32,
    /// Experience awarded on victory.
    pub xp_gained: u32,
    /// Gold awarded on victory.
    pub gold_gained: u32,
}

/// One resolved turn. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Story the turn was played in.
    pub story_id: Uuid,
    /// Character who acted.
    pub character_id: Uuid,
    /// 1-based turn number within the character's stream.
    pub turn_number: u32,
    /// Player's action text.
    pub action: String,
    /// Final, sanitised narration.
    pub narration: String,
    /// Whether a combat round was resolved.
    pub combat_occurred: bool,
    /// Details of that round.
    pub combat_summary: Option<CombatSummary>,
}
