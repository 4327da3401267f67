//! What a resolved turn returns to the player.

use serde::Serialize;
use taleforge_character::domain::sheet::CombatState;
use taleforge_narrative::domain::hints::DetectedEntity;
use taleforge_rules::domain::mortality::DeathOutcome;
use taleforge_rules::domain::progression::LevelUp;

/// Active encounter after the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatView {
    /// Enemy name.
    pub enemy: String,
    /// Enemy's current hit points.
    pub enemy_hp: i32,
    /// Enemy's maximum hit points.
    pub enemy_max_hp: i32,
    /// Rounds resolved so far.
    pub round: u32,
}

impl From<&CombatState> for CombatView {
    fn from(combat: &CombatState) -> Self {
        Self {
            enemy: combat.enemy_name.clone(),
            enemy_hp: combat.enemy_hp,
            enemy_max_hp: combat.enemy_max_hp,
            round: combat.round,
        }
    }
}

/// A death that happened this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeathView {
    /// Brought back at half hit points.
    pub resurrected: bool,
    /// Lost for good.
    pub permanent: bool,
    /// Player-facing message.
    pub message: String,
}

impl From<&DeathOutcome> for DeathView {
    fn from(death: &DeathOutcome) -> Self {
        Self {
            resurrected: death.resurrected,
            permanent: death.permanent,
            message: death.message.clone(),
        }
    }
}

/// Response to `TakeTurn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnResponse {
    /// Number of the resolved turn.
    pub turn_number: u32,
    /// Final, sanitised narration.
    pub narration: String,
    /// Quest progress and survival-day hints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quest_hint: Option<String>,
    /// Survival warnings after decay.
    pub survival_warnings: Vec<String>,
    /// Any need at its floor or fatigue at its ceiling.
    pub critical_condition: bool,
    /// Next actions suggested by the narrator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<Vec<String>>,
    /// Catalog entities named in the narration.
    pub detected_entities: Vec<DetectedEntity>,
    /// Encounter still active after the turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combat: Option<CombatView>,
    /// Log of the combat round resolved this turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combat_log: Option<Vec<String>>,
    /// Death this turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death: Option<DeathView>,
    /// Level gained this turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_up: Option<LevelUp>,
    /// The story's survival goal was reached this turn.
    pub survival_completed: bool,
    /// The narration was redacted.
    pub output_sanitized: bool,
}
