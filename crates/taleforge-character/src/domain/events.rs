//! Domain events for the Character context.

use serde::{Deserialize, Serialize};
use taleforge_core::event::{EventEnvelope, EventKind};

use super::sheet::CharacterSheet;
use super::turn::TurnRecord;

/// Payload of the first event of every character stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterCreated {
    /// Initial sheet.
    pub sheet: CharacterSheet,
}

/// A turn was resolved; carries the record and the resulting sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResolved {
    /// The immutable turn record.
    pub turn: TurnRecord,
    /// Sheet after the turn.
    pub sheet: CharacterSheet,
}

/// Event payloads of the Character context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CharacterEventKind {
    /// A character was created.
    CharacterCreated(CharacterCreated),
    /// A turn was resolved.
    TurnResolved(TurnResolved),
}

impl EventKind for CharacterEventKind {
    fn type_name(&self) -> &'static str {
        match self {
            Self::CharacterCreated(_) => "character.character_created",
            Self::TurnResolved(_) => "character.turn_resolved",
        }
    }
}

/// A character event with its metadata.
pub type CharacterEvent = EventEnvelope<CharacterEventKind>;
