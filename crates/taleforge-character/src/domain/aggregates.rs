//! Aggregate root for the Character context.
//!
//! A character's event stream is the per-character keyed store: it holds
//! the sheet (including any active combat) and the turn history. Every turn
//! appends at the version it was loaded from, so at most one of two
//! concurrent turns for the same character commits.

use std::collections::VecDeque;

use taleforge_core::aggregate::AggregateRoot;
use taleforge_core::clock::Clock;
use taleforge_core::error::DomainError;
use taleforge_core::event::EventEnvelope;
use taleforge_core::repository::StoredEvent;
use uuid::Uuid;

use super::events::{CharacterCreated, CharacterEvent, CharacterEventKind, TurnResolved};
use super::sheet::CharacterSheet;
use super::turn::TurnRecord;

/// Turns kept in memory for context building.
pub const RECENT_TURN_LIMIT: usize = 3;

/// The aggregate root for a character.
#[derive(Debug)]
pub struct Character {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    sheet: Option<CharacterSheet>,
    turn_count: u32,
    recent_turns: VecDeque<TurnRecord>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<CharacterEvent>,
}

impl Character {
    /// Creates an empty character with no history.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            sheet: None,
            turn_count: 0,
            recent_turns: VecDeque::with_capacity(RECENT_TURN_LIMIT),
            uncommitted_events: Vec::new(),
        }
    }

    /// The current sheet, once created.
    #[must_use]
    pub fn sheet(&self) -> Option<&CharacterSheet> {
        self.sheet.as_ref()
    }

    /// Number of turns resolved so far.
    #[must_use]
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// Up to the last three turns, oldest first.
    #[must_use]
    pub fn recent_turns(&self) -> Vec<TurnRecord> {
        self.recent_turns.iter().cloned().collect()
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn record(&mut self, kind: CharacterEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = EventEnvelope::new(
            self.id,
            self.next_sequence_number(),
            correlation_id,
            clock.now(),
            kind,
        );
        self.uncommitted_events.push(event);
    }

    /// Creates the character, producing a `CharacterCreated` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the character already exists,
    /// the sheet belongs to another id, the name is blank, or hit points
    /// are not positive.
    pub fn create(
        &mut self,
        sheet: CharacterSheet,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.sheet.is_some() || !self.uncommitted_events.is_empty() {
            return Err(DomainError::Validation(format!(
                "character {} already exists",
                self.id
            )));
        }
        if sheet.id != self.id {
            return Err(DomainError::Validation(
                "sheet id does not match character id".to_owned(),
            ));
        }
        if sheet.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "character name must not be blank".to_owned(),
            ));
        }
        if sheet.max_hp <= 0 {
            return Err(DomainError::Validation(
                "max_hp must be positive".to_owned(),
            ));
        }

        self.record(
            CharacterEventKind::CharacterCreated(CharacterCreated { sheet }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Records a resolved turn, producing a `TurnResolved` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the character does not exist,
    /// the record belongs to another character, or the turn number is not
    /// the next one in sequence.
    pub fn record_turn(
        &mut self,
        turn: TurnRecord,
        sheet: CharacterSheet,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.sheet.is_none() {
            return Err(DomainError::Validation(format!(
                "character {} has not been created",
                self.id
            )));
        }
        if turn.character_id != self.id || sheet.id != self.id {
            return Err(DomainError::Validation(
                "turn belongs to another character".to_owned(),
            ));
        }
        let expected = self.turn_count + 1;
        if turn.turn_number != expected {
            return Err(DomainError::Validation(format!(
                "expected turn {expected}, got {}",
                turn.turn_number
            )));
        }

        self.record(
            CharacterEventKind::TurnResolved(TurnResolved { turn, sheet }),
            correlation_id,
            clock,
        );
        Ok(())
    }
}

impl AggregateRoot for Character {
    type Event = CharacterEvent;

    fn empty(id: Uuid) -> Self {
        Self::new(id)
    }

    fn decode(stored: &StoredEvent) -> Result<Self::Event, DomainError> {
        CharacterEvent::from_stored(stored)
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            CharacterEventKind::CharacterCreated(created) => {
                self.sheet = Some(created.sheet.clone());
            }
            CharacterEventKind::TurnResolved(resolved) => {
                self.sheet = Some(resolved.sheet.clone());
                self.turn_count = resolved.turn.turn_number;
                if self.recent_turns.len() == RECENT_TURN_LIMIT {
                    self.recent_turns.pop_front();
                }
                self.recent_turns.push_back(resolved.turn.clone());
            }
        }
        self.version = event.metadata.sequence_number;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
