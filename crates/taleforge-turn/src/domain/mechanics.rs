//! The synchronous mechanics phase of a turn.
//!
//! Everything that needs the RNG happens here, in one call, so the caller
//! can hold the RNG lock for exactly this block.

use chrono::NaiveDate;
use taleforge_character::domain::sheet::CharacterSheet;
use taleforge_content::domain::model::EnemyTemplate;
use taleforge_core::rng::DeterministicRng;
use taleforge_rules::domain::action::{PlayerActionKind, classify_combat_action, is_rest_request};
use taleforge_rules::domain::combat::{EnemyInstance, RoundOutcome, resolve_round};
use taleforge_rules::domain::encounter::roll_encounter;
use taleforge_rules::domain::mortality::DeathOutcome;
use taleforge_rules::domain::survival::{
    REST_HOURS, RestReport, StatPenalties, SurvivalReport, SurvivalStatus, end_of_turn, rest,
};
use tracing::{info, warn};

/// Inputs of the mechanics phase besides the sheet.
#[derive(Debug, Clone, Copy)]
pub struct MechanicsInput<'a> {
    /// Number of the turn being resolved.
    pub turn_number: u32,
    /// Player's action text.
    pub action: &'a str,
    /// Explicit combat action, if the request carried one.
    pub combat_action: Option<PlayerActionKind>,
    /// Enemy templates of the character's story.
    pub templates: &'a [EnemyTemplate],
    /// Today's UTC date.
    pub today: NaiveDate,
}

/// What the mechanics phase did to the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MechanicsReport {
    /// Combat round resolved this turn.
    pub round: Option<RoundOutcome>,
    /// Enemy spawned by the encounter roll.
    pub encounter: Option<EnemyInstance>,
    /// Rest taken instead of exploring.
    pub rest: Option<RestReport>,
    /// Survival phase; absent when the character died for good in combat.
    pub survival: Option<SurvivalReport>,
    /// Combat referenced a template that no longer exists and was reset.
    pub stale_combat_reset: bool,
    /// A new calendar day was counted.
    pub new_day: bool,
}

impl MechanicsReport {
    /// The latest death of the turn. Survival runs after combat, so a
    /// starvation death outranks a combat resurrection earlier in the turn.
    #[must_use]
    pub fn death(&self) -> Option<&DeathOutcome> {
        self.survival_death()
            .or_else(|| self.round.as_ref().and_then(|r| r.death.as_ref()))
    }

    /// Survival death, for the directive.
    #[must_use]
    pub fn survival_death(&self) -> Option<&DeathOutcome> {
        self.survival.as_ref().and_then(|s| s.death.as_ref())
    }
}

fn active_template<'a>(
    sheet: &mut CharacterSheet,
    templates: &'a [EnemyTemplate],
) -> (Option<&'a EnemyTemplate>, bool) {
    let Some(combat) = sheet.combat.as_ref() else {
        return (None, false);
    };
    match templates.iter().find(|t| t.id == combat.enemy_template_id) {
        Some(template) => (Some(template), false),
        None => {
            warn!(
                character_id = %sheet.id,
                template_id = %combat.enemy_template_id,
                "combat references an unknown enemy template, resetting to idle"
            );
            sheet.combat = None;
            (None, true)
        }
    }
}

/// Runs combat or exploration, the survival phase, and the day counter.
pub fn resolve_mechanics(
    sheet: &mut CharacterSheet,
    input: &MechanicsInput<'_>,
    rng: &mut dyn DeterministicRng,
) -> MechanicsReport {
    let (template, stale_combat_reset) = active_template(sheet, input.templates);

    let mut round = None;
    let mut encounter = None;
    let mut rested = None;

    if let (Some(template), Some(combat)) = (template, sheet.combat.clone()) {
        let mut enemy = EnemyInstance::resume(template, &combat);
        let requested = input
            .combat_action
            .unwrap_or_else(|| classify_combat_action(input.action));
        let penalties = StatPenalties::for_needs(&sheet.survival);
        let outcome = resolve_round(sheet, &mut enemy, requested, &penalties, rng);
        if let Some(level_up) = &outcome.level_up {
            info!(character_id = %sheet.id, level = level_up.new_level, "character levelled up");
        }
        round = Some(outcome);
    } else if is_rest_request(input.action) {
        rested = Some(rest(sheet, REST_HOURS));
    } else if let Some(enemy) =
        roll_encounter(input.turn_number, sheet.level, input.templates, rng)
    {
        info!(character_id = %sheet.id, enemy = %enemy.name, "encounter triggered");
        sheet.combat = Some(enemy.to_combat_state(0));
        encounter = Some(enemy);
    }

    let survival = sheet.is_alive().then(|| end_of_turn(sheet));

    let mut new_day = false;
    if sheet.is_alive() && sheet.last_played_on != Some(input.today) {
        sheet.days_survived += 1;
        sheet.last_played_on = Some(input.today);
        new_day = true;
    }

    MechanicsReport {
        round,
        encounter,
        rest: rested,
        survival,
        stale_combat_reset,
        new_day,
    }
}

/// Current survival status, from the report or recomputed for the dead.
#[must_use]
pub fn survival_status(report: &MechanicsReport, sheet: &CharacterSheet) -> SurvivalStatus {
    report.survival.as_ref().map_or_else(
        || SurvivalStatus::assess(&sheet.survival),
        |s| s.status.clone(),
    )
}
