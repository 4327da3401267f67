//! World catalog entities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Survival goal used when a story does not set one.
pub const DEFAULT_SURVIVAL_GOAL_DAYS: u32 = 10;

/// A story (world) characters play in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Story identifier.
    pub id: Uuid,
    /// Title shown to players.
    pub title: String,
    /// Genre, e.g. "dark fantasy".
    pub genre: String,
    /// Short world description handed to the narrator.
    pub world_description: String,
    /// Opening scene, used until a character has its own summary.
    pub current_state: Option<String>,
    /// Distinct days a character must survive to complete the story.
    pub survival_goal_days: u32,
}

/// Static combat stats of an enemy kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Template identifier.
    pub id: Uuid,
    /// Story the template belongs to.
    pub story_id: Uuid,
    /// Display name.
    pub name: String,
    /// Flavour text.
    pub description: Option<String>,
    /// Difficulty level.
    pub level: u32,
    /// Hit points at spawn.
    pub max_hp: i32,
    /// Attack power.
    pub attack: i32,
    /// Defense; drives armour class when none is set.
    pub defense: i32,
    /// Explicit armour class.
    pub armor_class: Option<i32>,
    /// Explicit attack-roll bonus.
    pub attack_bonus: Option<i32>,
    /// Experience awarded on defeat.
    pub xp_reward: u32,
    /// Lower bound of the gold reward.
    pub gold_min: u32,
    /// Upper bound of the gold reward.
    pub gold_max: u32,
    /// Portrait reference.
    pub portrait: Option<String>,
}

/// A non-player character of a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    /// NPC identifier.
    pub id: Uuid,
    /// Story the NPC belongs to.
    pub story_id: Uuid,
    /// Display name.
    pub name: String,
    /// Portrait reference.
    pub portrait: Option<String>,
}

/// Main storyline or optional quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    /// Main storyline.
    Main,
    /// Optional side quest.
    Side,
}

/// A quest and its ordered objectives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    /// Quest identifier.
    pub id: Uuid,
    /// Story the quest belongs to.
    pub story_id: Uuid,
    /// Title shown to players.
    pub title: String,
    /// Main or side.
    pub kind: QuestKind,
    /// Objective descriptions, in order.
    pub objectives: Vec<String>,
}

/// A quest a character is working on, with per-objective completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestProgress {
    /// The quest.
    pub quest: Quest,
    /// Completion flag per objective, same order as `quest.objectives`.
    pub completed: Vec<bool>,
}

impl QuestProgress {
    /// A quest with no objective completed yet.
    #[must_use]
    pub fn fresh(quest: Quest) -> Self {
        let completed = vec![false; quest.objectives.len()];
        Self { quest, completed }
    }

    /// Objectives not completed yet, in order.
    pub fn pending_objectives(&self) -> impl Iterator<Item = &str> {
        self.quest
            .objectives
            .iter()
            .zip(self.completed.iter().chain(std::iter::repeat(&false)))
            .filter(|(_, done)| !**done)
            .map(|(objective, _)| objective.as_str())
    }

    /// `(done, total)` objective counts.
    #[must_use]
    pub fn counts(&self) -> (usize, usize) {
        let done = self.completed.iter().filter(|done| **done).count();
        (done, self.quest.objectives.len())
    }
}
