//! Shared application state.

use std::sync::{Arc, Mutex};

use taleforge_content::domain::catalog::WorldCatalog;
use taleforge_content::infrastructure::static_catalog::StaticCatalog;
use taleforge_core::clock::Clock;
use taleforge_core::repository::EventRepository;
use taleforge_core::rng::DeterministicRng;
use taleforge_gateway::NarrationGateway;
use taleforge_moderation::ContentGuard;
use taleforge_turn::application::command_handlers::TurnServices;
use taleforge_turn::domain::presence::PresenceRegistry;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for deterministic timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// RNG for dice; locked only while a turn resolves its mechanics.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Event repository holding every character stream.
    pub event_repository: Arc<dyn EventRepository>,
    /// World catalog.
    pub catalog: Arc<dyn WorldCatalog>,
    /// SHA-256 of the loaded catalog, reported by `/health`.
    pub catalog_fingerprint: Arc<str>,
    /// Narration provider chain.
    pub gateway: Arc<NarrationGateway>,
    /// Moderation of actions and narration.
    pub guard: ContentGuard,
    /// Characters seen recently.
    pub presence: Arc<PresenceRegistry>,
}

impl AppState {
    /// Create new application state around a loaded catalog.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        event_repository: Arc<dyn EventRepository>,
        catalog: Arc<StaticCatalog>,
        gateway: NarrationGateway,
        guard: ContentGuard,
    ) -> Self {
        let catalog_fingerprint = Arc::from(catalog.fingerprint());
        Self {
            clock,
            rng,
            event_repository,
            catalog,
            catalog_fingerprint,
            gateway: Arc::new(gateway),
            guard,
            presence: Arc::new(PresenceRegistry::default()),
        }
    }

    /// Borrows the collaborators of the turn pipeline.
    #[must_use]
    pub fn turn_services(&self) -> TurnServices<'_> {
        TurnServices {
            clock: self.clock.as_ref(),
            rng: &*self.rng,
            repo: &*self.event_repository,
            catalog: &*self.catalog,
            gateway: &self.gateway,
            guard: &self.guard,
            presence: &self.presence,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("catalog_fingerprint", &self.catalog_fingerprint)
            .field("gateway", &self.gateway)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}
