//! Routes for the Turn context.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::Deserialize;
use taleforge_rules::domain::action::PlayerActionKind;
use taleforge_turn::application::command_handlers;
use taleforge_turn::domain::commands::TakeTurn;
use taleforge_turn::domain::response::TurnResponse;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

fn default_language() -> String {
    "en".to_owned()
}

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct TakeTurnRequest {
    /// Acting character.
    pub character_id: Uuid,
    /// Free-text action.
    pub action: String,
    /// Narration language tag.
    #[serde(default = "default_language")]
    pub language: String,
    /// Explicit combat action, overriding keyword classification.
    pub combat_action: Option<PlayerActionKind>,
}

/// POST /
#[instrument(skip(state, request), fields(character_id = %request.character_id))]
async fn take_turn(
    State(state): State<AppState>,
    Json(request): Json<TakeTurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let command = TakeTurn {
        correlation_id: Uuid::new_v4(),
        character_id: request.character_id,
        action: request.action,
        language: request.language,
        combat_action: request.combat_action,
    };

    info!(correlation_id = %command.correlation_id, "handling take_turn command");

    let response = command_handlers::handle_take_turn(&command, &state.turn_services()).await?;
    Ok(Json(response))
}

/// Returns the router for the turn context.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(take_turn))
}
