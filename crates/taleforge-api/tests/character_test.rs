//! Integration tests for the Character context.

mod common;

use axum::http::StatusCode;
use uuid::Uuid;

#[tokio::test]
async fn test_character_create_round_trip() {
    let app = common::build_test_app();

    // POST /api/v1/characters
    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/characters",
        &serde_json::json!({ "story_id": common::STORY_ID, "name": "Alaric" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["event_ids"].as_array().unwrap().len(), 1);
    let character_id = json["character_id"].as_str().unwrap().to_owned();

    // GET /api/v1/characters/{id}
    let (status, json) =
        common::get_json(app, &format!("/api/v1/characters/{character_id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["character_id"], character_id);
    assert_eq!(json["version"], 1);
    assert_eq!(json["turn_count"], 0);
    assert_eq!(json["sheet"]["name"], "Alaric");
    assert_eq!(json["sheet"]["stats"]["strength"], 10);
    assert_eq!(json["sheet"]["max_hp"], 100);
    assert_eq!(json["sheet"]["survival"]["hunger"], 100);
    assert_eq!(json["sheet"]["status"], "alive");
}

#[tokio::test]
async fn test_character_create_keeps_requested_stats() {
    let app = common::build_test_app();
    let character_id = common::create_character(&app, "Brynna").await;

    let (status, json) =
        common::get_json(app, &format!("/api/v1/characters/{character_id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sheet"]["profession"], "Ranger");
    assert_eq!(json["sheet"]["stats"]["strength"], 14);
    assert_eq!(json["sheet"]["stats"]["magic"], 10);
    assert_eq!(json["sheet"]["hp"], 30);
}

#[tokio::test]
async fn test_character_create_unknown_story_returns_404() {
    let app = common::build_test_app();

    let (status, json) = common::post_json(
        app,
        "/api/v1/characters",
        &serde_json::json!({ "story_id": Uuid::new_v4(), "name": "Lost" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "aggregate_not_found");
}

#[tokio::test]
async fn test_character_create_blank_name_returns_400() {
    let app = common::build_test_app();

    let (status, json) = common::post_json(
        app,
        "/api/v1/characters",
        &serde_json::json!({ "story_id": common::STORY_ID, "name": "   " }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_character_create_missing_fields_returns_422() {
    let app = common::build_test_app();

    let (status, _) =
        common::post_json(app, "/api/v1/characters", &serde_json::json!({})).await;

    // Axum rejects bodies that do not deserialize.
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_character_get_nonexistent_returns_404() {
    let app = common::build_test_app();
    let character_id = Uuid::new_v4();

    let (status, json) =
        common::get_json(app, &format!("/api/v1/characters/{character_id}")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "aggregate_not_found");
}

#[tokio::test]
async fn test_recent_turns_keep_the_last_three() {
    let app = common::build_test_app();
    let character_id = common::create_character(&app, "Cael").await;

    for action in ["look around", "walk north", "sing softly", "check my character"] {
        let (status, json) = common::post_json(
            app.clone(),
            "/api/v1/turns",
            &serde_json::json!({ "character_id": character_id, "action": action }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "turn failed: {json}");
    }

    let (status, json) =
        common::get_json(app, &format!("/api/v1/characters/{character_id}/turns")).await;

    assert_eq!(status, StatusCode::OK);
    let turns = json.as_array().unwrap();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0]["turn_number"], 2);
    assert_eq!(turns[0]["action"], "walk north");
    assert_eq!(turns[2]["turn_number"], 4);
}
