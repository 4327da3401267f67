//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use taleforge_content::infrastructure::static_catalog::StaticCatalog;
use taleforge_core::clock::Clock;
use taleforge_core::rng::DeterministicRng;
use taleforge_event_store::InMemoryEventRepository;
use taleforge_gateway::{NarrationGateway, NarrationProvider, RetryPolicy, StubProvider};
use taleforge_moderation::ContentGuard;
use taleforge_test_support::{MockRng, SequenceRng, fixed_clock};
use tower::ServiceExt;

use taleforge_api::state::AppState;

/// Story every test character joins.
pub const STORY_ID: &str = "11111111-1111-4111-8111-111111111111";

/// A one-story catalog with a single low-level enemy.
pub const CATALOG_YAML: &str = r"
stories:
  - id: 11111111-1111-4111-8111-111111111111
    title: Ashen Vale
    genre: dark fantasy
    world_description: A valley under a grey sky.
    survival_goal_days: 3
    enemies:
      - id: 22222222-2222-4222-8222-222222222222
        name: Goblin
        level: 1
        max_hp: 12
        attack: 10
        defense: 4
        xp_reward: 25
        gold_min: 1
        gold_max: 6
    npcs:
      - id: 33333333-3333-4333-8333-333333333333
        name: Mira
";

/// Build the full app router over an in-memory event store and a stub-only
/// narration chain.
pub fn build_test_app() -> Router {
    build_test_app_with_rng(SequenceRng::new(vec![]))
}

/// Build the app with a custom `SequenceRng` for tests that need
/// deterministic dice rolls and encounters.
pub fn build_test_app_with_rng(rng: SequenceRng) -> Router {
    build_test_app_with(rng, vec![Arc::new(StubProvider)])
}

/// Build the app with a custom RNG and provider chain.
pub fn build_test_app_with(rng: SequenceRng, providers: Vec<Arc<dyn NarrationProvider>>) -> Router {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(fixed_clock());
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    let event_repository = Arc::new(InMemoryEventRepository::new());
    let catalog = Arc::new(StaticCatalog::from_yaml_str(CATALOG_YAML).unwrap());

    let mut gateway = NarrationGateway::new(Arc::new(Mutex::new(MockRng)));
    for provider in providers {
        gateway = gateway.with_provider(provider, RetryPolicy::single_attempt());
    }

    let app_state = AppState::new(
        clock,
        rng,
        event_repository,
        catalog,
        gateway,
        ContentGuard::default(),
    );
    taleforge_api::app(app_state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

/// Create a character in the test story and return its id.
pub async fn create_character(app: &Router, name: &str) -> String {
    let (status, json) = post_json(
        app.clone(),
        "/api/v1/characters",
        &serde_json::json!({
            "story_id": STORY_ID,
            "name": name,
            "profession": "Ranger",
            "stats": { "strength": 14, "dexterity": 12 },
            "hp": 30
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {json}");
    json["character_id"].as_str().unwrap().to_owned()
}
