//! Process-local registry of recently active characters.
//!
//! Companions only enrich the narration context; nothing here is game
//! state, so it is neither persisted nor shared between instances.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use taleforge_character::domain::sheet::CharacterSheet;
use taleforge_core::error::DomainError;
use taleforge_narrative::domain::context::PartyMember;
use uuid::Uuid;

/// How long a character counts as present after its last turn.
pub const PRESENCE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
struct Presence {
    story_id: Uuid,
    member: PartyMember,
    seen_at: DateTime<Utc>,
}

/// Characters seen recently, keyed by character id.
#[derive(Debug)]
pub struct PresenceRegistry {
    ttl: Duration,
    entries: Mutex<HashMap<Uuid, Presence>>,
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new(Duration::minutes(PRESENCE_TTL_MINUTES))
    }
}

impl PresenceRegistry {
    /// A registry forgetting characters after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Marks the character as active at `now`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the registry lock is poisoned.
    pub fn touch(&self, sheet: &CharacterSheet, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("presence mutex poisoned: {e}")))?;
        entries.insert(
            sheet.id,
            Presence {
                story_id: sheet.story_id,
                member: PartyMember {
                    name: sheet.name.clone(),
                    class: sheet.class_name().to_owned(),
                    lvl: sheet.level,
                },
                seen_at: now,
            },
        );
        Ok(())
    }

    /// Other characters active in `story_id` within the TTL, sorted by
    /// name. Expired entries are dropped.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the registry lock is poisoned.
    pub fn party_for(
        &self,
        story_id: Uuid,
        character_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<PartyMember>, DomainError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("presence mutex poisoned: {e}")))?;
        let ttl = self.ttl;
        entries.retain(|_, p| now - p.seen_at <= ttl);

        let mut party: Vec<PartyMember> = entries
            .iter()
            .filter(|(id, p)| **id != character_id && p.story_id == story_id)
            .map(|(_, p)| p.member.clone())
            .collect();
        party.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(party)
    }
}
