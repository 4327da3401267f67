//! Routes for the Character context.

use axum::extract::{Path, State};
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use taleforge_character::application::{command_handlers, query_handlers};
use taleforge_character::domain::commands;
use taleforge_character::domain::sheet::CoreStats;
use taleforge_character::domain::turn::TurnRecord;
use taleforge_content::domain::catalog::require_story;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Score of every stat the request leaves out.
pub const DEFAULT_STAT: i32 = 10;
/// Starting hit points when the request leaves them out.
pub const DEFAULT_MAX_HP: i32 = 100;

/// Starting stats; omitted stats default to 10.
#[derive(Debug, Deserialize)]
pub struct StatsRequest {
    /// Melee power.
    #[serde(default = "default_stat")]
    pub strength: i32,
    /// Spell power and mana pool.
    #[serde(default = "default_stat")]
    pub magic: i32,
    /// Agility.
    #[serde(default = "default_stat")]
    pub dexterity: i32,
    /// Armour.
    #[serde(default = "default_stat")]
    pub defense: i32,
}

fn default_stat() -> i32 {
    DEFAULT_STAT
}

impl Default for StatsRequest {
    fn default() -> Self {
        Self {
            strength: DEFAULT_STAT,
            magic: DEFAULT_STAT,
            dexterity: DEFAULT_STAT,
            defense: DEFAULT_STAT,
        }
    }
}

impl From<StatsRequest> for CoreStats {
    fn from(stats: StatsRequest) -> Self {
        Self {
            strength: stats.strength,
            magic: stats.magic,
            dexterity: stats.dexterity,
            defense: stats.defense,
        }
    }
}

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequest {
    /// Story to join.
    pub story_id: Uuid,
    /// Character name.
    pub name: String,
    /// Optional class or profession.
    pub profession: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Starting stats.
    #[serde(default)]
    pub stats: StatsRequest,
    /// Starting hit points.
    pub hp: Option<i32>,
}

/// Response body returned after a character is created.
#[derive(Debug, Serialize)]
pub struct CreateCharacterResponse {
    /// Identifier of the new character.
    pub character_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
}

/// POST /
#[instrument(skip(state, request), fields(story_id = %request.story_id))]
async fn create_character(
    State(state): State<AppState>,
    Json(request): Json<CreateCharacterRequest>,
) -> Result<Json<CreateCharacterResponse>, ApiError> {
    require_story(&*state.catalog, request.story_id).await?;

    let command = commands::CreateCharacter {
        correlation_id: Uuid::new_v4(),
        character_id: Uuid::new_v4(),
        story_id: request.story_id,
        name: request.name,
        profession: request.profession,
        description: request.description,
        stats: request.stats.into(),
        max_hp: request.hp.unwrap_or(DEFAULT_MAX_HP),
    };

    info!(correlation_id = %command.correlation_id, "handling create_character command");

    let stored_events = command_handlers::handle_create_character(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    let event_ids = stored_events.iter().map(|e| e.event_id).collect();

    Ok(Json(CreateCharacterResponse {
        character_id: command.character_id,
        event_ids,
    }))
}

/// GET /{id}
async fn get_character(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<query_handlers::CharacterView>, ApiError> {
    let view = query_handlers::get_character_by_id(id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// GET /{id}/turns
async fn list_turns(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TurnRecord>>, ApiError> {
    let turns = query_handlers::list_recent_turns(id, &*state.event_repository).await?;
    Ok(Json(turns))
}

/// Returns the router for the character context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_character))
        .route("/{id}", get(get_character))
        .route("/{id}/turns", get(list_turns))
}
