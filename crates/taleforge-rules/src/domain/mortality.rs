//! Death and resurrection policy shared by combat and survival.
//!
//! The first death of a character is forgiven; the second is permanent.

use serde::Serialize;
use taleforge_character::domain::sheet::{CharacterSheet, LifeStatus, SurvivalStats};
use tracing::info;

/// XP lost when resurrected after a combat defeat.
pub const COMBAT_XP_PENALTY: u32 = 50;
/// XP lost when resurrected after starving or dying of thirst.
pub const STARVATION_XP_PENALTY: u32 = 100;

/// What killed the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// Hit points reached zero in combat.
    Combat,
    /// Hunger or thirst reached zero, or survival drain emptied hit points.
    Starvation,
}

/// Result of applying the death policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeathOutcome {
    /// Cause of death.
    pub cause: DeathCause,
    /// The character was brought back.
    pub resurrected: bool,
    /// The character is gone for good.
    pub permanent: bool,
    /// Experience deducted on resurrection.
    pub xp_lost: u32,
    /// User-facing message.
    pub message: String,
}

/// Applies the death policy to `sheet`.
///
/// Always increments `deaths` and clears any combat. A character that can
/// still resurrect loses that ability, comes back at half hit points, and
/// pays an XP penalty; starvation also restores needs partially. Otherwise
/// the character becomes permanently `Dead` with 0 hp.
pub fn apply_death(sheet: &mut CharacterSheet, cause: DeathCause) -> DeathOutcome {
    sheet.deaths += 1;
    sheet.combat = None;

    if sheet.can_resurrect {
        sheet.can_resurrect = false;
        sheet.hp = sheet.max_hp / 2;
        let penalty = match cause {
            DeathCause::Combat => COMBAT_XP_PENALTY,
            DeathCause::Starvation => STARVATION_XP_PENALTY,
        };
        let xp_lost = sheet.xp.min(penalty);
        sheet.xp -= xp_lost;
        let message = match cause {
            DeathCause::Combat => "You were defeated but resurrected!",
            DeathCause::Starvation => {
                sheet.survival = SurvivalStats::new(50, 50, 30);
                "You died from starvation/dehydration but were resurrected!"
            }
        };
        info!(character_id = %sheet.id, ?cause, deaths = sheet.deaths, "character resurrected");
        return DeathOutcome {
            cause,
            resurrected: true,
            permanent: false,
            xp_lost,
            message: message.to_owned(),
        };
    }

    sheet.status = LifeStatus::Dead;
    sheet.hp = 0;
    info!(character_id = %sheet.id, ?cause, deaths = sheet.deaths, "character permanently dead");
    let message = match cause {
        DeathCause::Combat => "Permanent death. Your character is lost.",
        DeathCause::Starvation => "You have permanently died from lack of food and water...",
    };
    DeathOutcome {
        cause,
        resurrected: false,
        permanent: true,
        xp_lost: 0,
        message: message.to_owned(),
    }
}
