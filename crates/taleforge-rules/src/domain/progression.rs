//! Experience and levels.

use serde::Serialize;
use taleforge_character::domain::sheet::CharacterSheet;
use taleforge_core::rng::DeterministicRng;
use tracing::info;

/// Cap for every core stat and for max hit points.
pub const STAT_CAP: i32 = 200;

/// XP needed for levels 2 through 10.
const LEVEL_THRESHOLDS: [u32; 9] = [100, 300, 600, 1000, 1500, 2100, 2800, 3600, 4500];

/// XP per level beyond level 10.
const XP_PER_LEVEL_AFTER_TEN: u32 = 1000;

/// A level-up produced by an XP award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelUp {
    /// Level reached.
    pub new_level: u32,
    /// Levels gained by this award.
    pub levels_gained: u32,
    /// User-facing message.
    pub message: String,
}

/// Level for a given amount of experience.
#[must_use]
pub fn level_for_xp(xp: u32) -> u32 {
    let reached = LEVEL_THRESHOLDS.iter().take_while(|t| xp >= **t).count();
    // `reached` is at most 9.
    let level = 1 + u32::try_from(reached).unwrap_or(0);
    if level < 10 {
        return level;
    }
    10 + (xp - LEVEL_THRESHOLDS[8]) / XP_PER_LEVEL_AFTER_TEN
}

fn grow(value: i32, rng: &mut dyn DeterministicRng, min: u32, max: u32) -> i32 {
    let bonus = i32::try_from(rng.next_u32_range(min, max)).unwrap_or(0);
    value.saturating_add(bonus).min(STAT_CAP)
}

/// Adds `amount` XP and applies any level-ups.
///
/// Per level gained, strength, magic, dexterity and defense each grow by
/// 2..=5 and max hp by 5..=10 (all capped at 200). Hit points are then
/// restored to max.
pub fn award_xp(
    sheet: &mut CharacterSheet,
    amount: u32,
    rng: &mut dyn DeterministicRng,
) -> Option<LevelUp> {
    sheet.xp = sheet.xp.saturating_add(amount);
    let new_level = level_for_xp(sheet.xp);
    if new_level <= sheet.level {
        return None;
    }

    let levels_gained = new_level - sheet.level;
    for _ in 0..levels_gained {
        sheet.stats.strength = grow(sheet.stats.strength, rng, 2, 5);
        sheet.stats.magic = grow(sheet.stats.magic, rng, 2, 5);
        sheet.stats.dexterity = grow(sheet.stats.dexterity, rng, 2, 5);
        sheet.stats.defense = grow(sheet.stats.defense, rng, 2, 5);
        sheet.max_hp = grow(sheet.max_hp, rng, 5, 10);
    }
    sheet.hp = sheet.max_hp;
    sheet.level = new_level;

    info!(character_id = %sheet.id, new_level, levels_gained, "level up");
    Some(LevelUp {
        new_level,
        levels_gained,
        message: format!("LEVEL UP! You are now level {new_level}!"),
    })
}
