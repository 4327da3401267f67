//! Combat Resolver.
//!
//! One call to [`resolve_round`] plays a full round: initiative, both
//! sides' actions in order, and the end-of-combat bookkeeping (loot, XP,
//! death policy). The returned log is the canonical account of the round.

use serde::Serialize;
use taleforge_character::domain::sheet::{CharacterSheet, CombatState, CoreStats};
use taleforge_character::domain::turn::{CombatOutcome, CombatSummary};
use taleforge_content::domain::model::EnemyTemplate;
use taleforge_core::rng::DeterministicRng;
use uuid::Uuid;

use super::action::PlayerActionKind;
use super::dice::{armor_class, d20, modifier, roll};
use super::mortality::{DeathCause, DeathOutcome, apply_death};
use super::progression::{LevelUp, award_xp};
use super::survival::StatPenalties;

/// Mana a spell costs.
pub const SPELL_COST: i32 = 5;
/// Armour class bonus while defending.
pub const DEFEND_AC_BONUS: i32 = 2;

/// An enemy in an active encounter: its template plus current hit points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnemyInstance {
    /// Template the enemy was spawned from.
    pub template_id: Uuid,
    /// Display name.
    pub name: String,
    /// Current hit points, in `[0, max_hp]`.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    attack: i32,
    defense: i32,
    armor_class: Option<i32>,
    attack_bonus: Option<i32>,
    xp_reward: u32,
    gold_min: u32,
    gold_max: u32,
}

impl EnemyInstance {
    /// A fresh enemy at full hit points.
    #[must_use]
    pub fn spawn(template: &EnemyTemplate) -> Self {
        Self {
            template_id: template.id,
            name: template.name.clone(),
            hp: template.max_hp,
            max_hp: template.max_hp,
            attack: template.attack,
            defense: template.defense,
            armor_class: template.armor_class,
            attack_bonus: template.attack_bonus,
            xp_reward: template.xp_reward,
            gold_min: template.gold_min,
            gold_max: template.gold_max,
        }
    }

    /// The enemy of an ongoing encounter, hit points clamped to the
    /// template's range.
    #[must_use]
    pub fn resume(template: &EnemyTemplate, combat: &CombatState) -> Self {
        let mut enemy = Self::spawn(template);
        enemy.hp = combat.enemy_hp.clamp(0, enemy.max_hp);
        enemy
    }

    /// Template armour class, else `10 + floor(defense / 2)`.
    #[must_use]
    pub fn armor_class(&self) -> i32 {
        self.armor_class.unwrap_or_else(|| armor_class(self.defense))
    }

    /// Template attack bonus, else `floor(attack / 10)`.
    #[must_use]
    pub fn attack_bonus(&self) -> i32 {
        self.attack_bonus.unwrap_or_else(|| self.damage_bonus())
    }

    fn damage_bonus(&self) -> i32 {
        self.attack.div_euclid(10)
    }

    fn take_damage(&mut self, damage: i32) {
        self.hp = (self.hp - damage).clamp(0, self.max_hp);
    }

    /// Whether the enemy is down.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    /// Persistable combat state after `round` rounds.
    #[must_use]
    pub fn to_combat_state(&self, round: u32) -> CombatState {
        CombatState {
            enemy_template_id: self.template_id,
            enemy_name: self.name.clone(),
            enemy_hp: self.hp,
            enemy_max_hp: self.max_hp,
            round,
        }
    }
}

/// Rewards for a victory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Loot {
    /// Experience awarded.
    pub xp: u32,
    /// Gold awarded.
    pub gold: u32,
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundResult {
    /// Both sides still stand.
    Ongoing,
    /// The enemy fell.
    Victory,
    /// The player escaped.
    Fled,
    /// The player fell.
    Defeated,
}

/// Everything a round produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Round number, starting at 1.
    pub round: u32,
    /// Action actually taken (exhaustion can force `Defend`).
    pub action: PlayerActionKind,
    /// How the round ended.
    pub result: RoundResult,
    /// Ordered log lines.
    pub log: Vec<String>,
    /// Enemy fought.
    pub enemy_name: String,
    /// Player hit points before the round.
    pub player_hp_before: i32,
    /// Player hit points after the round and any death policy.
    pub player_hp_after: i32,
    /// Player maximum hit points after the round.
    pub player_max_hp: i32,
    /// Enemy hit points before the round.
    pub enemy_hp_before: i32,
    /// Enemy hit points after the round.
    pub enemy_hp_after: i32,
    /// Enemy maximum hit points.
    pub enemy_max_hp: i32,
    /// Victory rewards.
    pub loot: Option<Loot>,
    /// Level-up from the victory XP.
    pub level_up: Option<LevelUp>,
    /// Death policy result on defeat.
    pub death: Option<DeathOutcome>,
}

impl RoundOutcome {
    /// Short statement of the result, used in narration directives.
    #[must_use]
    pub fn result_line(&self) -> String {
        match self.result {
            RoundResult::Ongoing => format!("The fight with {} continues.", self.enemy_name),
            RoundResult::Victory => format!("{} is defeated.", self.enemy_name),
            RoundResult::Fled => format!("The player escaped from {}.", self.enemy_name),
            RoundResult::Defeated => match &self.death {
                Some(death) if death.permanent => {
                    "The player was slain and is permanently dead.".to_owned()
                }
                _ => "The player was defeated and then resurrected.".to_owned(),
            },
        }
    }

    /// Structured summary for the persisted turn record.
    #[must_use]
    pub fn summary(&self) -> CombatSummary {
        let outcome = match self.result {
            RoundResult::Ongoing => CombatOutcome::Ongoing,
            RoundResult::Victory => CombatOutcome::Victory,
            RoundResult::Fled => CombatOutcome::Fled,
            RoundResult::Defeated => match &self.death {
                Some(death) if death.permanent => CombatOutcome::PermanentDeath,
                _ => CombatOutcome::Resurrected,
            },
        };
        CombatSummary {
            enemy_name: self.enemy_name.clone(),
            outcome,
            log: self.log.clone(),
            player_hp_before: self.player_hp_before,
            player_hp_after: self.player_hp_after,
            enemy_hp_before: self.enemy_hp_before,
            enemy_hp_after: self.enemy_hp_after,
            xp_gained: self.loot.map_or(0, |l| l.xp),
            gold_gained: self.loot.map_or(0, |l| l.gold),
        }
    }
}

/// Flee success chance: `clamp(0.5 + 0.05 * dex_modifier, 0.10, 0.90)`.
#[must_use]
pub fn flee_chance(dexterity_modifier: i32) -> f64 {
    (0.5 + 0.05 * f64::from(dexterity_modifier)).clamp(0.10, 0.90)
}

struct Round<'a> {
    sheet: &'a mut CharacterSheet,
    enemy: &'a mut EnemyInstance,
    effective: CoreStats,
    rng: &'a mut dyn DeterministicRng,
    log: Vec<String>,
}

impl Round<'_> {
    fn player_attack(&mut self) {
        let natural = d20(self.rng);
        let m = modifier(self.effective.strength);
        let ac = self.enemy.armor_class();
        let total = natural + m;

        if natural == 20 {
            let damage = roll(self.rng, 2, 8) + m.max(0);
            self.enemy.take_damage(damage);
            self.log.push(format!("CRITICAL HIT! (rolled 20) - {damage} damage!"));
        } else if natural == 1 {
            self.log.push("CRITICAL MISS! (rolled 1)".to_owned());
        } else if total >= ac {
            let damage = roll(self.rng, 1, 8) + m.max(0);
            self.enemy.take_damage(damage);
            self.log.push(format!(
                "Hit! (rolled {natural}{m:+}={total} vs AC {ac}) - {damage} damage"
            ));
        } else {
            self.log
                .push(format!("Miss! (rolled {natural}{m:+}={total} vs AC {ac})"));
        }
    }

    fn player_magic(&mut self) {
        if self.sheet.stats.magic < SPELL_COST {
            self.log.push("Not enough mana!".to_owned());
            return;
        }
        let m = modifier(self.effective.magic);
        let damage = roll(self.rng, 2, 6) + m.max(0);
        self.sheet.stats.magic -= SPELL_COST;
        self.enemy.take_damage(damage);
        self.log
            .push(format!("Spell hits! - {damage} magical damage"));
    }

    fn enemy_attack(&mut self, defending: bool) {
        let name = self.enemy.name.clone();
        let natural = d20(self.rng);
        let total = natural + self.enemy.attack_bonus();
        let mut ac = armor_class(self.effective.defense);
        if defending {
            ac += DEFEND_AC_BONUS;
        }

        let damage = if natural == 20 {
            roll(self.rng, 2, 6) + self.enemy.damage_bonus()
        } else if natural == 1 {
            self.log.push(format!("{name} fumbles! (rolled 1)"));
            return;
        } else if total >= ac {
            roll(self.rng, 1, 6) + self.enemy.damage_bonus()
        } else {
            self.log
                .push(format!("{name} misses! (rolled {total} vs AC {ac})"));
            return;
        };

        let damage = if defending {
            (damage / 2).max(1)
        } else {
            damage.max(0)
        };
        self.sheet.hp = (self.sheet.hp - damage).max(0);

        if defending {
            self.log.push(format!(
                "{name} attacks but you block most of it! - {damage} damage"
            ));
        } else if natural == 20 {
            self.log
                .push(format!("{name} lands a CRITICAL HIT! (rolled 20) - {damage} damage"));
        } else {
            self.log.push(format!("{name} hits! - {damage} damage"));
        }
    }

    fn player_acts(&mut self, action: PlayerActionKind) {
        match action {
            PlayerActionKind::Attack => self.player_attack(),
            PlayerActionKind::Magic => self.player_magic(),
            PlayerActionKind::Defend => self
                .log
                .push("You brace for defense! (+2 AC this round)".to_owned()),
            PlayerActionKind::Flee => {}
        }
    }

    fn player_down(&self) -> bool {
        self.sheet.hp <= 0
    }

    /// Initiative then both actions; returns the result before bookkeeping.
    fn exchange(&mut self, action: PlayerActionKind) -> RoundResult {
        let defending = action == PlayerActionKind::Defend;
        let player_init = d20(self.rng) + modifier(self.effective.dexterity);
        let enemy_init = d20(self.rng) + modifier(self.enemy.defense);

        if player_init >= enemy_init {
            self.log.push(format!(
                "You act first! (Initiative: {player_init} vs {enemy_init})"
            ));
            self.player_acts(action);
            if self.enemy.is_defeated() {
                return RoundResult::Victory;
            }
            self.enemy_attack(defending);
            if self.player_down() {
                return RoundResult::Defeated;
            }
        } else {
            self.log.push(format!(
                "{} acts first! (Initiative: {enemy_init} vs {player_init})",
                self.enemy.name
            ));
            self.enemy_attack(defending);
            if self.player_down() {
                return RoundResult::Defeated;
            }
            self.player_acts(action);
            if self.enemy.is_defeated() {
                return RoundResult::Victory;
            }
        }
        RoundResult::Ongoing
    }

    fn flee(&mut self) -> RoundResult {
        let chance = flee_chance(modifier(self.effective.dexterity));
        if self.rng.next_f64() < chance {
            self.log
                .push("You successfully escape! (DEX check passed)".to_owned());
            return RoundResult::Fled;
        }
        self.log
            .push("Failed to escape! (DEX check failed)".to_owned());
        self.enemy_attack(false);
        if self.player_down() {
            RoundResult::Defeated
        } else {
            RoundResult::Ongoing
        }
    }
}

/// Resolves one combat round between the character and `enemy`.
///
/// Updates the sheet in place: hit points, mana, gold, XP and level, the
/// death policy on defeat, and the combat state (advanced while ongoing,
/// cleared on victory, flight, or defeat).
pub fn resolve_round(
    sheet: &mut CharacterSheet,
    enemy: &mut EnemyInstance,
    requested: PlayerActionKind,
    penalties: &StatPenalties,
    rng: &mut dyn DeterministicRng,
) -> RoundOutcome {
    let round_number = sheet.combat.as_ref().map_or(0, |c| c.round) + 1;
    let player_hp_before = sheet.hp;
    let enemy_hp_before = enemy.hp;

    let mut log = vec![format!(
        "Round {round_number} - Your HP: {}/{}, {} HP: {}/{}",
        sheet.hp, sheet.max_hp, enemy.name, enemy.hp, enemy.max_hp
    )];

    let action = match requested {
        PlayerActionKind::Attack | PlayerActionKind::Magic if penalties.combat_disabled => {
            log.push("You are too exhausted to fight and can only defend!".to_owned());
            PlayerActionKind::Defend
        }
        other => other,
    };

    let effective = penalties.apply(&sheet.stats);
    let mut round = Round {
        sheet,
        enemy,
        effective,
        rng,
        log,
    };
    let result = if action == PlayerActionKind::Flee {
        round.flee()
    } else {
        round.exchange(action)
    };
    let Round {
        sheet,
        enemy,
        rng,
        mut log,
        ..
    } = round;

    let mut loot = None;
    let mut level_up = None;
    let mut death = None;
    match result {
        RoundResult::Ongoing => {
            sheet.combat = Some(enemy.to_combat_state(round_number));
        }
        RoundResult::Victory => {
            let gold = rng.next_u32_range(enemy.gold_min, enemy.gold_max);
            let xp = enemy.xp_reward;
            sheet.gold = sheet.gold.saturating_add(gold);
            sheet.combat = None;
            log.push(format!(
                "Victory! You defeated {}! (+{xp} XP, +{gold} gold)",
                enemy.name
            ));
            level_up = award_xp(sheet, xp, rng);
            if let Some(up) = &level_up {
                log.push(up.message.clone());
            }
            loot = Some(Loot { xp, gold });
        }
        RoundResult::Fled => {
            sheet.combat = None;
        }
        RoundResult::Defeated => {
            log.push("You have been defeated!".to_owned());
            let outcome = apply_death(sheet, DeathCause::Combat);
            log.push(outcome.message.clone());
            death = Some(outcome);
        }
    }

    RoundOutcome {
        round: round_number,
        action,
        result,
        log,
        enemy_name: enemy.name.clone(),
        player_hp_before,
        player_hp_after: sheet.hp,
        player_max_hp: sheet.max_hp,
        enemy_hp_before,
        enemy_hp_after: enemy.hp,
        enemy_max_hp: enemy.max_hp,
        loot,
        level_up,
        death,
    }
}
