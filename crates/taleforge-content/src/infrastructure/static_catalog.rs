//! YAML-backed world catalog.
//!
//! The whole catalog is loaded once at startup and kept in memory. Its
//! SHA-256 fingerprint identifies the exact content a deployment serves.

use std::fmt::Write as _;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use taleforge_core::error::DomainError;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::domain::catalog::WorldCatalog;
use crate::domain::model::{
    DEFAULT_SURVIVAL_GOAL_DAYS, EnemyTemplate, Npc, Quest, QuestKind, QuestProgress, Story,
};

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The YAML did not match the catalog schema.
    #[error("invalid catalog YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The catalog parsed but is inconsistent.
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    stories: Vec<StoryEntry>,
}

#[derive(Debug, Deserialize)]
struct StoryEntry {
    id: Uuid,
    title: String,
    genre: String,
    world_description: String,
    current_state: Option<String>,
    survival_goal_days: Option<u32>,
    #[serde(default)]
    enemies: Vec<EnemyEntry>,
    #[serde(default)]
    npcs: Vec<NpcEntry>,
    #[serde(default)]
    quests: Vec<QuestEntry>,
}

#[derive(Debug, Deserialize)]
struct EnemyEntry {
    id: Uuid,
    name: String,
    description: Option<String>,
    #[serde(default = "default_level")]
    level: u32,
    max_hp: i32,
    attack: i32,
    defense: i32,
    armor_class: Option<i32>,
    attack_bonus: Option<i32>,
    #[serde(default)]
    xp_reward: u32,
    #[serde(default)]
    gold_min: u32,
    #[serde(default)]
    gold_max: u32,
    portrait: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NpcEntry {
    id: Uuid,
    name: String,
    portrait: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuestEntry {
    id: Uuid,
    title: String,
    #[serde(default = "default_quest_kind")]
    kind: QuestKind,
    #[serde(default)]
    objectives: Vec<String>,
}

fn default_level() -> u32 {
    1
}

fn default_quest_kind() -> QuestKind {
    QuestKind::Side
}

/// In-memory catalog parsed from YAML.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    stories: Vec<Story>,
    enemies: Vec<EnemyTemplate>,
    npcs: Vec<Npc>,
    quests: Vec<Quest>,
    fingerprint: String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

impl StaticCatalog {
    /// Parses a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed YAML and
    /// `CatalogError::Invalid` for duplicate stories, non-positive enemy
    /// hit points, or inverted gold ranges.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        let mut catalog = Self {
            fingerprint: sha256_hex(yaml.as_bytes()),
            ..Self::default()
        };

        for entry in file.stories {
            if catalog.stories.iter().any(|s| s.id == entry.id) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate story id {}",
                    entry.id
                )));
            }
            let story_id = entry.id;
            for enemy in entry.enemies {
                if enemy.max_hp <= 0 {
                    return Err(CatalogError::Invalid(format!(
                        "enemy {} must have positive max_hp",
                        enemy.name
                    )));
                }
                if enemy.gold_min > enemy.gold_max {
                    return Err(CatalogError::Invalid(format!(
                        "enemy {} has gold_min above gold_max",
                        enemy.name
                    )));
                }
                catalog.enemies.push(EnemyTemplate {
                    id: enemy.id,
                    story_id,
                    name: enemy.name,
                    description: enemy.description,
                    level: enemy.level,
                    max_hp: enemy.max_hp,
                    attack: enemy.attack,
                    defense: enemy.defense,
                    armor_class: enemy.armor_class,
                    attack_bonus: enemy.attack_bonus,
                    xp_reward: enemy.xp_reward,
                    gold_min: enemy.gold_min,
                    gold_max: enemy.gold_max,
                    portrait: enemy.portrait,
                });
            }
            catalog
                .npcs
                .extend(entry.npcs.into_iter().map(|npc| Npc {
                    id: npc.id,
                    story_id,
                    name: npc.name,
                    portrait: npc.portrait,
                }));
            catalog
                .quests
                .extend(entry.quests.into_iter().map(|quest| Quest {
                    id: quest.id,
                    story_id,
                    title: quest.title,
                    kind: quest.kind,
                    objectives: quest.objectives,
                }));
            catalog.stories.push(Story {
                id: story_id,
                title: entry.title,
                genre: entry.genre,
                world_description: entry.world_description,
                current_state: entry.current_state,
                survival_goal_days: entry
                    .survival_goal_days
                    .unwrap_or(DEFAULT_SURVIVAL_GOAL_DAYS),
            });
        }

        Ok(catalog)
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, otherwise as
    /// [`StaticCatalog::from_yaml_str`].
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&yaml)?;
        info!(
            path = %path.display(),
            stories = catalog.stories.len(),
            enemies = catalog.enemies.len(),
            fingerprint = %catalog.fingerprint,
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Hex SHA-256 of the YAML source.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

#[async_trait]
impl WorldCatalog for StaticCatalog {
    async fn story(&self, story_id: Uuid) -> Result<Option<Story>, DomainError> {
        Ok(self.stories.iter().find(|s| s.id == story_id).cloned())
    }

    async fn enemy_templates(&self, story_id: Uuid) -> Result<Vec<EnemyTemplate>, DomainError> {
        Ok(self
            .enemies
            .iter()
            .filter(|e| e.story_id == story_id)
            .cloned()
            .collect())
    }

    async fn npcs(&self, story_id: Uuid) -> Result<Vec<Npc>, DomainError> {
        Ok(self
            .npcs
            .iter()
            .filter(|n| n.story_id == story_id)
            .cloned()
            .collect())
    }

    // Static catalogs carry no per-character progress: every quest of the
    // story is active with nothing completed.
    async fn active_quests(
        &self,
        story_id: Uuid,
        _character_id: Uuid,
    ) -> Result<Vec<QuestProgress>, DomainError> {
        Ok(self
            .quests
            .iter()
            .filter(|q| q.story_id == story_id)
            .cloned()
            .map(QuestProgress::fresh)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::require_story;

    const STORY_ID: &str = "7d1c2f64-2f0e-4c55-9a59-3f7f6f4f1a01";

    fn yaml() -> String {
        format!(
            r#"
stories:
  - id: {STORY_ID}
    title: The Ashen Vale
    genre: dark fantasy
    world_description: A valley smothered by volcanic ash.
    enemies:
      - id: 0b7e7c3e-6f55-4b1f-9a0e-1c8f3b0e2a11
        name: Ash Wolf
        level: 2
        max_hp: 14
        attack: 22
        defense: 12
        xp_reward: 40
        gold_min: 2
        gold_max: 6
    npcs:
      - id: 5a0c9a43-92f4-4b0e-8d0a-2a3b4c5d6e7f
        name: Old Maren
    quests:
      - id: 9e8d7c6b-5a4f-4e3d-8c2b-1a0f9e8d7c6b
        title: Light the Beacon
        kind: main
        objectives: [Climb the tower, Find oil]
"#
        )
    }

    #[tokio::test]
    async fn test_from_yaml_str_scopes_entities_to_their_story() {
        // Arrange
        let catalog = StaticCatalog::from_yaml_str(&yaml()).unwrap();
        let story_id: Uuid = STORY_ID.parse().unwrap();

        // Act
        let story = require_story(&catalog, story_id).await.unwrap();
        let enemies = catalog.enemy_templates(story_id).await.unwrap();
        let npcs = catalog.npcs(story_id).await.unwrap();
        let quests = catalog.active_quests(story_id, Uuid::new_v4()).await.unwrap();

        // Assert
        assert_eq!(story.title, "The Ashen Vale");
        assert_eq!(story.survival_goal_days, DEFAULT_SURVIVAL_GOAL_DAYS);
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].story_id, story_id);
        assert_eq!(enemies[0].armor_class, None);
        assert_eq!(npcs[0].name, "Old Maren");
        assert_eq!(quests[0].quest.kind, QuestKind::Main);
        assert_eq!(quests[0].counts(), (0, 2));
    }

    #[tokio::test]
    async fn test_require_story_returns_not_found_for_unknown_story() {
        let catalog = StaticCatalog::from_yaml_str(&yaml()).unwrap();
        let unknown = Uuid::new_v4();

        let result = require_story(&catalog, unknown).await;

        match result.unwrap_err() {
            DomainError::AggregateNotFound(id) => assert_eq!(id, unknown),
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_fingerprint_is_stable_and_content_sensitive() {
        let a = StaticCatalog::from_yaml_str(&yaml()).unwrap();
        let b = StaticCatalog::from_yaml_str(&yaml()).unwrap();
        let c = StaticCatalog::from_yaml_str(&yaml().replace("Ash Wolf", "Ash Hound")).unwrap();

        assert_eq!(a.fingerprint().len(), 64);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_inverted_gold_range_is_rejected() {
        let broken = yaml().replace("gold_min: 2", "gold_min: 9");

        let result = StaticCatalog::from_yaml_str(&broken);

        match result {
            Err(CatalogError::Invalid(msg)) => assert!(msg.contains("gold_min")),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        let result = StaticCatalog::from_yaml_str("stories: [ {id: nope");

        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }
}
