//! Ground-truth directives.
//!
//! A directive states mechanics the engine has already resolved, so the
//! narration provider describes them instead of inventing its own.

use taleforge_rules::domain::combat::{EnemyInstance, RoundOutcome};
use taleforge_rules::domain::mortality::DeathOutcome;

const HEADER: &str = "GROUND TRUTH (already resolved by the game engine):";
const FOOTER: &str = "Narrate exactly this outcome. Do not change who hit whom, damage dealt, \
hit points, or the result, and do not invent new statistics.";

/// Facts gathered during the mechanics phase of a turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    facts: Vec<String>,
}

impl Directive {
    /// An empty directive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the log, final hit points and result of a combat round.
    pub fn record_round(&mut self, outcome: &RoundOutcome) {
        self.facts.extend(
            outcome
                .log
                .iter()
                .map(|line| line.trim())
                .filter(|line| !line.is_empty())
                .map(str::to_owned),
        );
        self.facts.push(format!(
            "Final HP: player {}/{}, {} {}/{}",
            outcome.player_hp_after,
            outcome.player_max_hp,
            outcome.enemy_name,
            outcome.enemy_hp_after,
            outcome.enemy_max_hp
        ));
        self.facts.push(format!("Result: {}", outcome.result_line()));
    }

    /// Adds a newly spawned encounter.
    pub fn record_encounter(&mut self, enemy: &EnemyInstance) {
        self.facts.push(format!(
            "A hostile {} ({}/{} HP) appears and combat begins.",
            enemy.name, enemy.hp, enemy.max_hp
        ));
    }

    /// Adds a death caused by hunger or thirst.
    pub fn record_survival_death(&mut self, death: &DeathOutcome) {
        self.facts.push(death.message.clone());
    }

    /// The recorded facts.
    #[must_use]
    pub fn facts(&self) -> &[String] {
        &self.facts
    }

    /// Renders the directive block, or `None` when there are no facts.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        if self.facts.is_empty() {
            return None;
        }
        let mut block = String::from(HEADER);
        for fact in &self.facts {
            block.push_str("\n- ");
            block.push_str(fact);
        }
        block.push('\n');
        block.push_str(FOOTER);
        Some(block)
    }
}
