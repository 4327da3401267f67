//! Classifying free-text player actions.

use serde::{Deserialize, Serialize};

/// What the player does in a combat round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerActionKind {
    /// Weapon attack.
    Attack,
    /// Spell attack; costs mana.
    Magic,
    /// Brace: +2 AC and halved damage this round.
    Defend,
    /// Try to escape.
    Flee,
}

const FLEE_WORDS: &[&str] = &["flee", "run", "escape", "retreat", "fuggo", "scappo"];
const MAGIC_WORDS: &[&str] = &["spell", "magic", "cast", "fireball", "incantesimo", "magia"];
const DEFEND_WORDS: &[&str] = &["defend", "block", "parry", "shield", "difendo", "paro"];
const REST_WORDS: &[&str] = &["rest", "sleep", "camp", "riposo", "dormo", "riposare", "dormire"];

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn mentions_any(text: &str, vocabulary: &[&str]) -> bool {
    words(text).any(|w| vocabulary.contains(&w.as_str()))
}

/// Picks the combat action described by `text` (English or Italian).
///
/// Flee wins over magic, magic over defend; anything else is an attack.
#[must_use]
pub fn classify_combat_action(text: &str) -> PlayerActionKind {
    if mentions_any(text, FLEE_WORDS) {
        PlayerActionKind::Flee
    } else if mentions_any(text, MAGIC_WORDS) {
        PlayerActionKind::Magic
    } else if mentions_any(text, DEFEND_WORDS) {
        PlayerActionKind::Defend
    } else {
        PlayerActionKind::Attack
    }
}

/// Whether `text` asks to rest or sleep.
#[must_use]
pub fn is_rest_request(text: &str) -> bool {
    mentions_any(text, REST_WORDS)
}
