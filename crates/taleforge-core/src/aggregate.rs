//! Aggregate root abstraction.

use uuid::Uuid;

use crate::error::DomainError;
use crate::event::DomainEvent;
use crate::repository::StoredEvent;

/// Trait for aggregate roots that reconstitute from event history.
pub trait AggregateRoot: Send + Sync + Sized {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Creates an empty aggregate with no history.
    fn empty(id: Uuid) -> Self;

    /// Decodes one stored event of this aggregate's stream.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the payload is not one of
    /// this aggregate's events.
    fn decode(stored: &StoredEvent) -> Result<Self::Event, DomainError>;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state (used during reconstitution).
    fn apply(&mut self, event: &Self::Event);

    /// Returns uncommitted events produced by command handling.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears uncommitted events after persistence.
    fn clear_uncommitted_events(&mut self);

    /// Replays a stored stream into a fresh aggregate.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if any event fails to decode.
    fn reconstitute(id: Uuid, history: &[StoredEvent]) -> Result<Self, DomainError> {
        let mut aggregate = Self::empty(id);
        for stored in history {
            let event = Self::decode(stored)?;
            aggregate.apply(&event);
        }
        Ok(aggregate)
    }

    /// Uncommitted events in stored form, ready to append.
    fn pending_stored_events(&self) -> Vec<StoredEvent> {
        self.uncommitted_events()
            .iter()
            .map(DomainEvent::to_stored)
            .collect()
    }
}
