//! Command handlers for the Character context.

use taleforge_core::aggregate::AggregateRoot;
use taleforge_core::clock::Clock;
use taleforge_core::error::DomainError;
use taleforge_core::repository::{EventRepository, StoredEvent};
use tracing::info;
use uuid::Uuid;

use crate::domain::aggregates::Character;
use crate::domain::commands::CreateCharacter;
use crate::domain::sheet::CharacterSheet;

/// Loads and replays a character stream.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the stream is empty, or
/// `DomainError::Infrastructure` if loading or decoding fails.
pub async fn load_character(
    character_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<Character, DomainError> {
    let stored_events = repo.load_events(character_id).await?;
    if stored_events.is_empty() {
        return Err(DomainError::AggregateNotFound(character_id));
    }
    Character::reconstitute(character_id, &stored_events)
}

/// Handles the `CreateCharacter` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an invalid or duplicate character,
/// or whatever the repository reports on append.
pub async fn handle_create_character(
    command: &CreateCharacter,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let existing_events = repo.load_events(command.character_id).await?;
    let mut character = Character::reconstitute(command.character_id, &existing_events)?;

    let mut sheet = CharacterSheet::new(
        command.character_id,
        command.story_id,
        command.name.trim().to_owned(),
        command.stats,
        command.max_hp,
    );
    sheet.profession.clone_from(&command.profession);
    sheet.description.clone_from(&command.description);
    sheet.last_played_on = Some(clock.today());

    character.create(sheet, command.correlation_id, clock)?;

    let stored_events = character.pending_stored_events();
    repo.append_events(command.character_id, character.version(), &stored_events)
        .await?;

    info!(
        character_id = %command.character_id,
        story_id = %command.story_id,
        "character created"
    );
    Ok(stored_events)
}
