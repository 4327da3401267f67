//! The world catalog contract.

use async_trait::async_trait;
use taleforge_core::error::DomainError;
use uuid::Uuid;

use super::model::{EnemyTemplate, Npc, QuestProgress, Story};

/// Read-only access to world data.
#[async_trait]
pub trait WorldCatalog: Send + Sync {
    /// Looks up a story.
    async fn story(&self, story_id: Uuid) -> Result<Option<Story>, DomainError>;

    /// Enemy templates of a story.
    async fn enemy_templates(&self, story_id: Uuid) -> Result<Vec<EnemyTemplate>, DomainError>;

    /// NPCs of a story.
    async fn npcs(&self, story_id: Uuid) -> Result<Vec<Npc>, DomainError>;

    /// Quests the character is working on in a story.
    async fn active_quests(
        &self,
        story_id: Uuid,
        character_id: Uuid,
    ) -> Result<Vec<QuestProgress>, DomainError>;
}

/// Looks up a story that must exist.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` with the story id when the
/// catalog has no such story.
pub async fn require_story(
    catalog: &dyn WorldCatalog,
    story_id: Uuid,
) -> Result<Story, DomainError> {
    catalog
        .story(story_id)
        .await?
        .ok_or(DomainError::AggregateNotFound(story_id))
}
