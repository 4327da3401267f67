//! Encounter Trigger.

use taleforge_content::domain::model::EnemyTemplate;
use taleforge_core::rng::DeterministicRng;

use super::combat::EnemyInstance;

/// Chance on the first turn of every ten-turn window.
pub const BASE_PROBABILITY: f64 = 0.20;
/// Added per turn within the window.
pub const PROBABILITY_STEP: f64 = 0.02;
/// Upper bound.
pub const MAX_PROBABILITY: f64 = 0.30;
/// Widest level gap between a character and a spawned enemy.
pub const LEVEL_WINDOW: u32 = 2;

/// Probability that `turn_number` spawns an encounter; always in
/// `[0.20, 0.30]`.
#[must_use]
pub fn encounter_probability(turn_number: u32) -> f64 {
    let ramp = (f64::from(turn_number % 10) * PROBABILITY_STEP).min(MAX_PROBABILITY - BASE_PROBABILITY);
    (BASE_PROBABILITY + ramp).min(MAX_PROBABILITY)
}

/// Independent Bernoulli draw against [`encounter_probability`].
pub fn should_trigger(turn_number: u32, rng: &mut dyn DeterministicRng) -> bool {
    rng.next_f64() < encounter_probability(turn_number)
}

/// Picks a template within two levels of `character_level`, uniformly.
pub fn select_template<'a>(
    templates: &'a [EnemyTemplate],
    character_level: u32,
    rng: &mut dyn DeterministicRng,
) -> Option<&'a EnemyTemplate> {
    let candidates: Vec<&EnemyTemplate> = templates
        .iter()
        .filter(|t| t.level.abs_diff(character_level) <= LEVEL_WINDOW)
        .collect();
    let last = candidates.len().checked_sub(1)?;
    let drawn = rng.next_u32_range(0, u32::try_from(last).unwrap_or(u32::MAX));
    let index = usize::try_from(drawn).unwrap_or(last).min(last);
    candidates.get(index).copied()
}

/// Rolls for an encounter on `turn_number` and spawns a matching enemy at
/// full hit points.
pub fn roll_encounter(
    turn_number: u32,
    character_level: u32,
    templates: &[EnemyTemplate],
    rng: &mut dyn DeterministicRng,
) -> Option<EnemyInstance> {
    if !should_trigger(turn_number, rng) {
        return None;
    }
    select_template(templates, character_level, rng).map(EnemyInstance::spawn)
}
