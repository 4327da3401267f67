//! Taleforge API server entry point.

use std::sync::{Arc, Mutex};

use sqlx::postgres::PgPoolOptions;
use taleforge_content::infrastructure::static_catalog::StaticCatalog;
use taleforge_core::clock::{Clock, SystemClock};
use taleforge_core::repository::EventRepository;
use taleforge_core::rng::{DeterministicRng, SystemRng};
use taleforge_event_store::schema::ensure_schema;
use taleforge_event_store::{InMemoryEventRepository, PgEventRepository};
use taleforge_gateway::build_gateway;
use taleforge_moderation::ContentGuard;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use taleforge_api::config::AppConfig;
use taleforge_api::error::AppError;
use taleforge_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Taleforge API server");

    let config = AppConfig::from_env()?;

    let event_repository: Arc<dyn EventRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await?;
            ensure_schema(&pool).await?;
            tracing::info!("Using PostgreSQL event store");
            Arc::new(PgEventRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory event store");
            Arc::new(InMemoryEventRepository::new())
        }
    };

    let catalog = Arc::new(StaticCatalog::from_path(&config.catalog_path)?);

    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
        Arc::new(Mutex::new(SystemRng::from_entropy()));
    let jitter: Arc<Mutex<dyn DeterministicRng + Send>> =
        Arc::new(Mutex::new(SystemRng::from_entropy()));
    let gateway = build_gateway(&config.gateway, jitter)?;
    tracing::info!(providers = ?gateway.providers(), "Narration chain ready");

    let guard = ContentGuard::new(config.filter_level);
    tracing::info!(level = ?guard.level(), "Content guard ready");

    let app_state = AppState::new(clock, rng, event_repository, catalog, gateway, guard);

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = taleforge_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
