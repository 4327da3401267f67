//! Context Compactor.
//!
//! Builds the small JSON snapshot handed to the narration provider. Keys
//! are short on purpose; every free-text field is truncated to a fixed
//! character budget.

use serde::Serialize;
use taleforge_character::domain::sheet::CharacterSheet;
use taleforge_character::domain::turn::TurnRecord;
use taleforge_content::domain::model::{QuestKind, QuestProgress, Story};

use super::text::truncate_chars;

/// Turns of history included.
pub const HISTORY_TURNS: usize = 3;
/// Budget for a history action.
pub const ACTION_BUDGET: usize = 100;
/// Budget for a history result.
pub const RESULT_BUDGET: usize = 150;
/// Incomplete objectives listed per quest.
pub const OBJECTIVES_PER_QUEST: usize = 2;
/// Budget for an objective.
pub const OBJECTIVE_BUDGET: usize = 80;

/// Core stats, abbreviated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsContext {
    /// Strength.
    pub str: i32,
    /// Magic.
    pub mag: i32,
    /// Dexterity.
    pub dex: i32,
    /// Defense.
    pub def: i32,
}

/// Survival needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeedsContext {
    /// Hunger.
    pub hunger: i32,
    /// Thirst.
    pub thirst: i32,
    /// Fatigue.
    pub fatigue: i32,
}

/// The acting character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharContext {
    /// Name.
    pub name: String,
    /// Class.
    pub class: String,
    /// Level.
    pub lvl: u32,
    /// `"hp/max_hp"`.
    pub hp: String,
    /// Stats.
    pub stats: StatsContext,
    /// Needs.
    pub needs: NeedsContext,
}

/// The story world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldContext {
    /// Story title.
    pub world: String,
    /// Genre.
    pub genre: String,
    /// Current scene.
    pub scene: String,
}

/// One past turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Truncated action.
    pub action: String,
    /// Truncated narration.
    pub result: String,
}

/// One active quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestContext {
    /// Quest title.
    pub quest: String,
    /// `MAIN` or `SIDE`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Up to two incomplete objectives.
    pub objectives: Vec<String>,
    /// `"done/total"`.
    pub progress: String,
}

/// Another active player in the same story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyMember {
    /// Name.
    pub name: String,
    /// Class.
    pub class: String,
    /// Level.
    pub lvl: u32,
}

/// The active enemy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoeContext {
    /// Enemy name.
    pub name: String,
    /// `"hp/max_hp"`.
    pub hp: String,
}

/// The compact snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompactContext {
    /// Acting character.
    pub char: CharContext,
    /// Story world.
    pub world: WorldContext,
    /// Last turns, oldest first.
    pub history: Vec<HistoryEntry>,
    /// Active quests.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quests: Vec<QuestContext>,
    /// Other active players.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub party: Vec<PartyMember>,
    /// Active enemy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foe: Option<FoeContext>,
}

impl CompactContext {
    /// Compact JSON rendering.
    #[must_use]
    pub fn to_json(&self) -> String {
        // Serializing plain derived structs cannot fail.
        serde_json::to_string(self).expect("context serialization is infallible")
    }
}

fn quest_context(progress: &QuestProgress) -> QuestContext {
    let (done, total) = progress.counts();
    QuestContext {
        quest: progress.quest.title.clone(),
        kind: match progress.quest.kind {
            QuestKind::Main => "MAIN",
            QuestKind::Side => "SIDE",
        },
        objectives: progress
            .pending_objectives()
            .take(OBJECTIVES_PER_QUEST)
            .map(|o| truncate_chars(o, OBJECTIVE_BUDGET).to_owned())
            .collect(),
        progress: format!("{done}/{total}"),
    }
}

/// Builds the compact context for one turn.
///
/// `recent_turns` may hold more than three entries; only the last three
/// are used. `party` lists other active players.
#[must_use]
pub fn build_context(
    sheet: &CharacterSheet,
    story: &Story,
    recent_turns: &[TurnRecord],
    active_quests: &[QuestProgress],
    party: &[PartyMember],
) -> CompactContext {
    let scene = sheet
        .current_state
        .clone()
        .or_else(|| story.current_state.clone())
        .unwrap_or_else(|| "Beginning of adventure".to_owned());

    let skip = recent_turns.len().saturating_sub(HISTORY_TURNS);
    let history = recent_turns[skip..]
        .iter()
        .map(|t| HistoryEntry {
            action: truncate_chars(&t.action, ACTION_BUDGET).to_owned(),
            result: truncate_chars(&t.narration, RESULT_BUDGET).to_owned(),
        })
        .collect();

    CompactContext {
        char: CharContext {
            name: sheet.name.clone(),
            class: sheet.class_name().to_owned(),
            lvl: sheet.level,
            hp: format!("{}/{}", sheet.hp, sheet.max_hp),
            stats: StatsContext {
                str: sheet.stats.strength,
                mag: sheet.stats.magic,
                dex: sheet.stats.dexterity,
                def: sheet.stats.defense,
            },
            needs: NeedsContext {
                hunger: sheet.survival.hunger(),
                thirst: sheet.survival.thirst(),
                fatigue: sheet.survival.fatigue(),
            },
        },
        world: WorldContext {
            world: story.title.clone(),
            genre: story.genre.clone(),
            scene,
        },
        history,
        quests: active_quests.iter().map(quest_context).collect(),
        party: party.to_vec(),
        foe: sheet.combat.as_ref().map(|c| FoeContext {
            name: c.enemy_name.clone(),
            hp: format!("{}/{}", c.enemy_hp, c.enemy_max_hp),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taleforge_character::domain::sheet::{CombatState, CoreStats};
    use taleforge_content::domain::model::Quest;
    use uuid::Uuid;

    fn sheet() -> CharacterSheet {
        CharacterSheet::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Aria".to_owned(),
            CoreStats {
                strength: 14,
                magic: 10,
                dexterity: 12,
                defense: 11,
            },
            30,
        )
    }

    fn story() -> Story {
        Story {
            id: Uuid::new_v4(),
            title: "The Ashen Vale".to_owned(),
            genre: "dark fantasy".to_owned(),
            world_description: "Ash everywhere.".to_owned(),
            current_state: None,
            survival_goal_days: 10,
        }
    }

    fn turn(n: u32, action: String) -> TurnRecord {
        TurnRecord {
            story_id: Uuid::new_v4(),
            character_id: Uuid::new_v4(),
            turn_number: n,
            action,
            narration: "x".repeat(400),
            combat_occurred: false,
            combat_summary: None,
        }
    }

    #[test]
    fn test_history_keeps_last_three_truncated_turns() {
        let turns: Vec<TurnRecord> = (1..=5).map(|n| turn(n, format!("{n}{}", "a".repeat(200)))).collect();

        let context = build_context(&sheet(), &story(), &turns, &[], &[]);

        assert_eq!(context.history.len(), 3);
        assert!(context.history[0].action.starts_with('3'));
        assert_eq!(context.history[0].action.chars().count(), 100);
        assert_eq!(context.history[0].result.chars().count(), 150);
    }

    #[test]
    fn test_scene_falls_back_to_story_then_default() {
        let mut s = story();
        let mut c = sheet();
        assert_eq!(build_context(&c, &s, &[], &[], &[]).world.scene, "Beginning of adventure");

        s.current_state = Some("At the gates".to_owned());
        assert_eq!(build_context(&c, &s, &[], &[], &[]).world.scene, "At the gates");

        c.current_state = Some("In the crypt".to_owned());
        assert_eq!(build_context(&c, &s, &[], &[], &[]).world.scene, "In the crypt");
    }

    #[test]
    fn test_quests_list_two_incomplete_objectives() {
        let quest = Quest {
            id: Uuid::new_v4(),
            story_id: Uuid::new_v4(),
            title: "Light the Beacon".to_owned(),
            kind: QuestKind::Main,
            objectives: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        };
        let mut progress = QuestProgress::fresh(quest);
        progress.completed[0] = true;

        let context = build_context(&sheet(), &story(), &[], &[progress], &[]);

        let q = &context.quests[0];
        assert_eq!(q.kind, "MAIN");
        assert_eq!(q.objectives, vec!["b".to_owned(), "c".to_owned()]);
        assert_eq!(q.progress, "1/4");
    }

    #[test]
    fn test_json_uses_short_keys_and_omits_empty_sections() {
        let mut c = sheet();
        c.combat = Some(CombatState {
            enemy_template_id: Uuid::new_v4(),
            enemy_name: "Goblin".to_owned(),
            enemy_hp: 4,
            enemy_max_hp: 7,
            round: 1,
        });

        let json = build_context(&c, &story(), &[], &[], &[]).to_json();

        assert!(json.starts_with(r#"{"char":{"name":"Aria","class":"Adventurer","lvl":1,"hp":"30/30""#));
        assert!(json.contains(r#""stats":{"str":14,"mag":10,"dex":12,"def":11}"#));
        assert!(json.contains(r#""foe":{"name":"Goblin","hp":"4/7"}"#));
        assert!(!json.contains("quests"));
        assert!(!json.contains("party"));
    }
}
