//! Survival Tracker: hunger, thirst and fatigue.

use serde::Serialize;
use taleforge_character::domain::sheet::{CharacterSheet, CoreStats, NEED_MAX, NEED_MIN, SurvivalStats};

use super::mortality::{DeathCause, DeathOutcome, apply_death};

/// Hunger lost per turn.
pub const HUNGER_DECAY_PER_TURN: i32 = 5;
/// Thirst lost per turn.
pub const THIRST_DECAY_PER_TURN: i32 = 8;
/// Fatigue gained per turn.
pub const FATIGUE_GAIN_PER_TURN: i32 = 3;

/// Hours a rest action lasts.
pub const REST_HOURS: i32 = 8;

/// Temporary stat modifiers caused by unmet needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatPenalties {
    /// Strength delta (zero or negative).
    pub strength: i32,
    /// Magic delta (zero or negative).
    pub magic: i32,
    /// Dexterity delta (zero or negative).
    pub dexterity: i32,
    /// Defense delta (zero or negative).
    pub defense: i32,
    /// Hit points lost at the end of the turn.
    pub hp_drain: i32,
    /// Too exhausted to attack or cast.
    pub combat_disabled: bool,
}

impl StatPenalties {
    /// Penalties for the given needs. Thresholds are cumulative.
    #[must_use]
    pub fn for_needs(needs: &SurvivalStats) -> Self {
        let mut p = Self::default();

        if needs.hunger() < 30 {
            p.strength -= 2;
            p.defense -= 1;
        }
        if needs.hunger() < 10 {
            p.strength -= 5;
            p.defense -= 3;
            p.hp_drain += 2;
        }

        if needs.thirst() < 40 {
            p.dexterity -= 3;
        }
        if needs.thirst() < 15 {
            p.dexterity -= 7;
            p.magic -= 3;
            p.hp_drain += 3;
        }

        if needs.fatigue() > 70 {
            p.strength -= 2;
            p.dexterity -= 2;
        }
        if needs.fatigue() > 90 {
            p.strength -= 5;
            p.dexterity -= 5;
            p.magic -= 3;
            p.combat_disabled = true;
        }

        p
    }

    /// Stats after penalties, floored at zero.
    #[must_use]
    pub fn apply(&self, stats: &CoreStats) -> CoreStats {
        CoreStats {
            strength: (stats.strength + self.strength).max(0),
            magic: (stats.magic + self.magic).max(0),
            dexterity: (stats.dexterity + self.dexterity).max(0),
            defense: (stats.defense + self.defense).max(0),
        }
    }
}

/// Derived, non-persisted view of a character's needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurvivalStatus {
    /// Active penalties.
    pub penalties: StatPenalties,
    /// User-facing warnings, at most one per need.
    pub warnings: Vec<String>,
    /// A need is at its floor or fatigue at its ceiling.
    pub critical: bool,
}

impl SurvivalStatus {
    /// Computes penalties, warnings and the critical flag for `needs`.
    #[must_use]
    pub fn assess(needs: &SurvivalStats) -> Self {
        let mut warnings = Vec::new();

        if needs.hunger() < 10 {
            warnings.push("You are starving! Eat food immediately!".to_owned());
        } else if needs.hunger() < 30 {
            warnings.push("You are hungry".to_owned());
        }

        if needs.thirst() < 15 {
            warnings.push("You are severely dehydrated! Drink water now!".to_owned());
        } else if needs.thirst() < 40 {
            warnings.push("You are thirsty".to_owned());
        }

        if needs.fatigue() > 90 {
            warnings.push("You are exhausted! You must rest!".to_owned());
        } else if needs.fatigue() > 70 {
            warnings.push("You are tired".to_owned());
        }

        Self {
            penalties: StatPenalties::for_needs(needs),
            warnings,
            critical: needs.hunger() == NEED_MIN
                || needs.thirst() == NEED_MIN
                || needs.fatigue() >= NEED_MAX,
        }
    }
}

/// Hunger or thirst has run out.
#[must_use]
pub fn is_starving(needs: &SurvivalStats) -> bool {
    needs.hunger() == NEED_MIN || needs.thirst() == NEED_MIN
}

/// Decays needs for `turns_elapsed` turns and returns the resulting status.
pub fn apply_decay(sheet: &mut CharacterSheet, turns_elapsed: u32) -> SurvivalStatus {
    let turns = i32::try_from(turns_elapsed).unwrap_or(i32::MAX);
    sheet.survival = sheet.survival.shifted(
        HUNGER_DECAY_PER_TURN.saturating_mul(turns).saturating_neg(),
        THIRST_DECAY_PER_TURN.saturating_mul(turns).saturating_neg(),
        FATIGUE_GAIN_PER_TURN.saturating_mul(turns),
    );
    SurvivalStatus::assess(&sheet.survival)
}

/// What a rest did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestReport {
    /// Hours rested.
    pub hours: i32,
    /// Fatigue removed.
    pub fatigue_reduced: i32,
}

/// Rests for `hours`: fatigue −10/h (never below zero), hunger −2/h,
/// thirst −3/h.
pub fn rest(sheet: &mut CharacterSheet, hours: i32) -> RestReport {
    let fatigue_reduced = (hours * 10).min(sheet.survival.fatigue());
    sheet.survival = sheet
        .survival
        .shifted(-(hours * 2), -(hours * 3), -fatigue_reduced);
    RestReport {
        hours,
        fatigue_reduced,
    }
}

/// Everything the survival phase of a turn did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurvivalReport {
    /// Status after the phase (recomputed after a resurrection).
    pub status: SurvivalStatus,
    /// Hit points lost to drain.
    pub hp_drained: i32,
    /// Death caused by starvation, dehydration, or drain.
    pub death: Option<DeathOutcome>,
}

/// Runs the end-of-turn survival phase: one turn of decay, hit point
/// drain, then the starvation death check.
pub fn end_of_turn(sheet: &mut CharacterSheet) -> SurvivalReport {
    let status = apply_decay(sheet, 1);

    let hp_drained = status.penalties.hp_drain.min(sheet.hp);
    sheet.hp -= hp_drained;
    let drained_to_death = hp_drained > 0 && sheet.hp == 0;

    if is_starving(&sheet.survival) || drained_to_death {
        let death = apply_death(sheet, DeathCause::Starvation);
        let status = SurvivalStatus::assess(&sheet.survival);
        return SurvivalReport {
            status,
            hp_drained,
            death: Some(death),
        };
    }

    SurvivalReport {
        status,
        hp_drained,
        death: None,
    }
}
