//! Post-narration hints: detected entities, quest and survival-day hints,
//! and the rolling current-state summary.

use serde::Serialize;
use taleforge_content::domain::model::{EnemyTemplate, Npc};

use super::text::truncate_chars;

/// Hint shown when the narration suggests quest progress.
pub const QUEST_PROGRESS_HINT: &str = "Quest progress detected! Check your active quests.";
/// Hint shown when the survival goal is reached.
pub const SURVIVAL_COMPLETED_HINT: &str = "SURVIVAL COMPLETED!";
/// Budget for the action part of the summary.
pub const SUMMARY_ACTION_BUDGET: usize = 100;
/// Budget for the narration part of the summary.
pub const SUMMARY_NARRATION_BUDGET: usize = 150;

/// Kind of a detected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// An enemy template.
    Enemy,
    /// A non-player character.
    Npc,
}

/// A catalog entity named in the narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedEntity {
    /// Catalog name.
    pub name: String,
    /// Enemy or NPC.
    pub kind: EntityKind,
    /// Portrait reference.
    pub portrait: Option<String>,
}

/// Every enemy template and NPC whose name occurs in `narration`,
/// case-insensitively, without duplicate names.
#[must_use]
pub fn detect_entities(
    narration: &str,
    enemies: &[EnemyTemplate],
    npcs: &[Npc],
) -> Vec<DetectedEntity> {
    let haystack = narration.to_lowercase();
    let candidates = enemies
        .iter()
        .map(|e| (&e.name, EntityKind::Enemy, &e.portrait))
        .chain(npcs.iter().map(|n| (&n.name, EntityKind::Npc, &n.portrait)));

    let mut seen: Vec<String> = Vec::new();
    let mut detected = Vec::new();
    for (name, kind, portrait) in candidates {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() || !haystack.contains(&needle) || seen.contains(&needle) {
            continue;
        }
        seen.push(needle);
        detected.push(DetectedEntity {
            name: name.clone(),
            kind,
            portrait: portrait.clone(),
        });
    }
    detected
}

/// Quest hint when the narration mentions a sparkle or a completed quest.
#[must_use]
pub fn quest_hint(narration: &str) -> Option<&'static str> {
    let lower = narration.to_lowercase();
    let progressed =
        narration.contains('✨') || (lower.contains("quest") && lower.contains("complete"));
    progressed.then_some(QUEST_PROGRESS_HINT)
}

/// Survival-day hint and whether the goal has been reached.
#[must_use]
pub fn survival_day_hint(days_survived: u32, goal_days: u32) -> (String, bool) {
    if goal_days > 0 && days_survived >= goal_days {
        (SURVIVAL_COMPLETED_HINT.to_owned(), true)
    } else {
        (format!("Day {days_survived}/{goal_days}"), false)
    }
}

/// Joins optional hints with ` | `.
#[must_use]
pub fn combine_hints(quest: Option<&str>, survival: Option<&str>) -> Option<String> {
    match (quest, survival) {
        (Some(q), Some(s)) => Some(format!("{q} | {s}")),
        (Some(h), None) | (None, Some(h)) => Some(h.to_owned()),
        (None, None) => None,
    }
}

/// The character's rolling summary: truncated action and narration.
#[must_use]
pub fn summarize_state(action: &str, narration: &str) -> String {
    format!(
        "{}... {}",
        truncate_chars(action.trim(), SUMMARY_ACTION_BUDGET),
        truncate_chars(narration.trim(), SUMMARY_NARRATION_BUDGET)
    )
}
