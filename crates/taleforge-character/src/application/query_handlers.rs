//! Query handlers for the Character context.
//!
//! Each query replays the character stream and returns a read-only view.

use serde::Serialize;
use taleforge_core::error::DomainError;
use taleforge_core::repository::EventRepository;
use uuid::Uuid;

use crate::application::command_handlers::load_character;
use crate::domain::sheet::CharacterSheet;
use crate::domain::turn::TurnRecord;

/// Read-only view of a character.
#[derive(Debug, Serialize)]
pub struct CharacterView {
    /// The character identifier.
    pub character_id: Uuid,
    /// Current version (event count).
    pub version: i64,
    /// Turns resolved so far.
    pub turn_count: u32,
    /// Current sheet.
    pub sheet: CharacterSheet,
}

/// Enemy part of a combat view.
#[derive(Debug, Serialize)]
pub struct EnemyView {
    /// Enemy name.
    pub name: String,
    /// Current hit points.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
}

/// Read-only view of a character's combat state.
#[derive(Debug, Serialize)]
pub struct CombatStatusView {
    /// Whether an encounter is active.
    pub in_combat: bool,
    /// Rounds resolved so far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    /// The enemy being fought.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enemy: Option<EnemyView>,
}

fn created_sheet(
    character_id: Uuid,
    sheet: Option<&CharacterSheet>,
) -> Result<&CharacterSheet, DomainError> {
    sheet.ok_or(DomainError::AggregateNotFound(character_id))
}

/// Retrieves a character by id.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_character_by_id(
    character_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<CharacterView, DomainError> {
    let character = load_character(character_id, repo).await?;
    let sheet = created_sheet(character_id, character.sheet())?.clone();
    Ok(CharacterView {
        character_id,
        version: character.version,
        turn_count: character.turn_count(),
        sheet,
    })
}

/// Lists up to the last three turns of a character, oldest first.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
pub async fn list_recent_turns(
    character_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<Vec<TurnRecord>, DomainError> {
    let character = load_character(character_id, repo).await?;
    Ok(character.recent_turns())
}

/// Describes the character's active encounter, if any.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
pub async fn get_combat_status(
    character_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<CombatStatusView, DomainError> {
    let character = load_character(character_id, repo).await?;
    let sheet = created_sheet(character_id, character.sheet())?;
    Ok(match &sheet.combat {
        Some(combat) => CombatStatusView {
            in_combat: true,
            round: Some(combat.round),
            enemy: Some(EnemyView {
                name: combat.enemy_name.clone(),
                hp: combat.enemy_hp,
                max_hp: combat.enemy_max_hp,
            }),
        },
        None => CombatStatusView {
            in_combat: false,
            round: None,
            enemy: None,
        },
    })
}
