//! Integration tests for session lookup and prompt regeneration.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_empty, post_multipart, MultipartForm, TestApp};

async fn generate(test: &TestApp, session_id: &str) -> serde_json::Value {
    let form = MultipartForm::new()
        .text("sessionId", session_id)
        .text("artistsText", "Amelie Lens, Charlotte de Witte")
        .text("genresText", "techno")
        .file("photos", "me.png", "image/png", b"png");

    let response = post_multipart(test.app(), "/api/generate", form).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Test: GET /api/session/{id} returns the stored record
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_session_returns_stored_record() {
    let test = common::build_test_app();
    let generated = generate(&test, "techno-1").await;

    let response = get(test.app(), "/api/session/techno-1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["sessionId"], "techno-1");
    assert_eq!(json["persona"], generated["persona"]);
    assert_eq!(json["prompts"], generated["prompts"]);
    assert_eq!(json["imageFilenames"], generated["imageFilenames"]);
    assert_eq!(json["sourceText"]["genresText"], "techno");
    assert_eq!(json["photosUsed"], 1);
    assert_eq!(
        json["persona"]["vibePhrases"],
        serde_json::json!(["warehouse-grade energy"])
    );
}

#[tokio::test]
async fn get_missing_session_returns_404() {
    let test = common::build_test_app();

    let response = get(test.app(), "/api/session/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: regenerating prompts leaves persona and images untouched
// ---------------------------------------------------------------------------

#[tokio::test]
async fn regenerate_prompts_preserves_persona_and_images() {
    let test = common::build_test_app();
    let generated = generate(&test, "regen-1").await;

    // Overwrite the stored prompts so a regeneration is observable.
    let stale = vec!["stale prompt".to_string()];
    assert!(test
        .state
        .sessions
        .update_prompts("regen-1", &stale)
        .await
        .unwrap());
    let before = test.state.sessions.find("regen-1").await.unwrap().unwrap();
    assert_eq!(before.prompts, stale);

    let response = post_empty(test.app(), "/api/regenerate-prompts/regen-1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let returned: Vec<String> = serde_json::from_value(json["prompts"].clone()).unwrap();
    assert_eq!(returned.len(), 4);
    assert_eq!(json["prompts"], generated["prompts"], "rendering is deterministic");
    assert!(returned[0].starts_with("Reference: 1 uploaded photo of the subject. "));

    let after = test.state.sessions.find("regen-1").await.unwrap().unwrap();
    assert_eq!(after.prompts, returned, "stored prompts are the returned ones");
    assert_ne!(after.prompts, stale);
    assert_eq!(after.persona, before.persona);
    assert_eq!(after.image_filenames, before.image_filenames);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at >= before.updated_at);
}

#[tokio::test]
async fn regenerate_prompts_for_missing_session_returns_404() {
    let test = common::build_test_app();

    let response = post_empty(test.app(), "/api/regenerate-prompts/nope").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}
