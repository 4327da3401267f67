//! Taleforge — HTTP API.
//!
//! Thin axum layer over the turn engine: configuration from the
//! environment, shared state, route handlers, and the mapping from domain
//! errors to HTTP responses.

use axum::Router;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use state::AppState;

/// Builds the full router with every context mounted at its prefix.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/characters", routes::character::router())
        .nest("/api/v1/combat", routes::combat::router())
        .nest("/api/v1/turns", routes::turn::router())
        .with_state(state)
}
