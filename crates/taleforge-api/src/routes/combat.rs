//! Routes for reading combat state.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use taleforge_character::application::query_handlers::{self, CombatStatusView};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /{character_id}
async fn get_combat(
    State(state): State<AppState>,
    Path(character_id): Path<Uuid>,
) -> Result<Json<CombatStatusView>, ApiError> {
    let view = query_handlers::get_combat_status(character_id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// Returns the router for the combat context.
pub fn router() -> Router<AppState> {
    Router::new().route("/{character_id}", get(get_combat))
}
