//! The character sheet and its value types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lower bound of every survival need.
pub const NEED_MIN: i32 = 0;
/// Upper bound of every survival need.
pub const NEED_MAX: i32 = 100;

/// The four core stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreStats {
    /// Melee power.
    pub strength: i32,
    /// Spell power and mana pool.
    pub magic: i32,
    /// Agility; drives initiative and fleeing.
    pub dexterity: i32,
    /// Armour; drives armour class.
    pub defense: i32,
}

/// Hunger, thirst and fatigue, each kept in `[0, 100]`.
///
/// Hunger and thirst count down towards starvation; fatigue counts up
/// towards exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurvivalStats {
    hunger: i32,
    thirst: i32,
    fatigue: i32,
}

impl SurvivalStats {
    /// Builds survival stats, clamping each value into `[0, 100]`.
    #[must_use]
    pub fn new(hunger: i32, thirst: i32, fatigue: i32) -> Self {
        Self {
            hunger: hunger.clamp(NEED_MIN, NEED_MAX),
            thirst: thirst.clamp(NEED_MIN, NEED_MAX),
            fatigue: fatigue.clamp(NEED_MIN, NEED_MAX),
        }
    }

    /// Well fed, hydrated and rested.
    #[must_use]
    pub fn fresh() -> Self {
        Self::new(NEED_MAX, NEED_MAX, NEED_MIN)
    }

    /// Current hunger.
    #[must_use]
    pub fn hunger(&self) -> i32 {
        self.hunger
    }

    /// Current thirst.
    #[must_use]
    pub fn thirst(&self) -> i32 {
        self.thirst
    }

    /// Current fatigue.
    #[must_use]
    pub fn fatigue(&self) -> i32 {
        self.fatigue
    }

    /// Returns a copy shifted by the given deltas, clamped.
    #[must_use]
    pub fn shifted(self, hunger: i32, thirst: i32, fatigue: i32) -> Self {
        Self::new(
            self.hunger.saturating_add(hunger),
            self.thirst.saturating_add(thirst),
            self.fatigue.saturating_add(fatigue),
        )
    }
}

impl Default for SurvivalStats {
    fn default() -> Self {
        Self::fresh()
    }
}

/// Whether the character can still play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStatus {
    /// Alive, possibly after one resurrection.
    Alive,
    /// Permanently dead.
    Dead,
}

/// The single active encounter of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    /// Template the enemy was spawned from.
    pub enemy_template_id: Uuid,
    /// Display name of the enemy.
    pub enemy_name: String,
    /// Enemy's current hit points, in `[0, enemy_max_hp]`.
    pub enemy_hp: i32,
    /// Enemy's maximum hit points.
    pub enemy_max_hp: i32,
    /// Rounds resolved so far.
    pub round: u32,
}

/// Full persisted state of a character between turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSheet {
    /// Character identifier (also the event stream id).
    pub id: Uuid,
    /// Story the character plays in.
    pub story_id: Uuid,
    /// Display name.
    pub name: String,
    /// Class or profession, if any.
    pub profession: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Base stats, before survival penalties.
    pub stats: CoreStats,
    /// Current hit points.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Current level, starting at 1.
    pub level: u32,
    /// Accumulated experience.
    pub xp: u32,
    /// Hunger, thirst and fatigue.
    pub survival: SurvivalStats,
    /// Number of deaths so far.
    pub deaths: u32,
    /// True until the first death has been forgiven.
    pub can_resurrect: bool,
    /// Alive or permanently dead.
    pub status: LifeStatus,
    /// Active encounter, if any.
    pub combat: Option<CombatState>,
    /// Gold carried.
    pub gold: u32,
    /// Short summary of the latest turn.
    pub current_state: Option<String>,
    /// Distinct calendar days played.
    pub days_survived: u32,
    /// UTC date of the latest turn.
    pub last_played_on: Option<NaiveDate>,
}

impl CharacterSheet {
    /// A level-1 character at full health with fresh needs.
    #[must_use]
    pub fn new(id: Uuid, story_id: Uuid, name: String, stats: CoreStats, max_hp: i32) -> Self {
        Self {
            id,
            story_id,
            name,
            profession: None,
            description: None,
            stats,
            hp: max_hp,
            max_hp,
            level: 1,
            xp: 0,
            survival: SurvivalStats::fresh(),
            deaths: 0,
            can_resurrect: true,
            status: LifeStatus::Alive,
            combat: None,
            gold: 0,
            current_state: None,
            days_survived: 0,
            last_played_on: None,
        }
    }

    /// Whether the character may still take turns.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.status == LifeStatus::Alive
    }

    /// Whether an encounter is active.
    #[must_use]
    pub fn in_combat(&self) -> bool {
        self.combat.is_some()
    }

    /// Display class, defaulting to "Adventurer".
    #[must_use]
    pub fn class_name(&self) -> &str {
        self.profession.as_deref().unwrap_or("Adventurer")
    }
}
