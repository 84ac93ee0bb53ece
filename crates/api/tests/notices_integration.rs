//! Integration tests for notices and the store error taxonomy.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    admin_token, create, get_request, json_request, notice_body, send, test_app,
    test_app_with_store,
};
use persistence::store::MemoryDocumentStore;
use serde_json::{json, Value};

fn titles(page: &Value) -> Vec<String> {
    page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_active_notices_most_recently_updated_first() {
    let app = test_app();
    let token = admin_token(&app).await;

    let first = create(&app, &token, "/api/v1/notices", notice_body("Office closed", true, false)).await;
    create(&app, &token, "/api/v1/notices", notice_body("Old drive", false, false)).await;
    create(&app, &token, "/api/v1/notices", notice_body("Volunteers needed", true, false)).await;

    let (_, page) = send(&app, get_request("/api/v1/notices?active_only=true", None)).await;
    assert_eq!(titles(&page), vec!["Volunteers needed", "Office closed"]);

    // Touching the older notice moves it to the front.
    let uri = format!("/api/v1/notices/{}", first["id"].as_str().unwrap());
    let (status, _) = send(
        &app,
        json_request(Method::PATCH, &uri, Some(&token), json!({ "content": "Closed until Sunday" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, page) = send(&app, get_request("/api/v1/notices?active_only=true", None)).await;
    assert_eq!(titles(&page), vec!["Office closed", "Volunteers needed"]);

    let (_, all) = send(&app, get_request("/api/v1/notices", None)).await;
    assert_eq!(all["pagination"]["total"], 3);
}

#[tokio::test]
async fn test_popup_notice() {
    let app = test_app();
    let token = admin_token(&app).await;

    let (status, body) = send(&app, get_request("/api/v1/notices/popup", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["notice"].is_null());

    create(&app, &token, "/api/v1/notices", notice_body("Inactive popup", false, true)).await;
    create(&app, &token, "/api/v1/notices", notice_body("Eid greetings", true, true)).await;
    create(&app, &token, "/api/v1/notices", notice_body("Plain notice", true, false)).await;

    let (_, body) = send(&app, get_request("/api/v1/notices/popup", None)).await;
    assert_eq!(body["notice"]["title"], "Eid greetings");
}

#[tokio::test]
async fn test_missing_index_answers_412_with_link() {
    let app = test_app_with_store(MemoryDocumentStore::new().require_composite_indexes());

    let (status, body) = send(&app, get_request("/api/v1/notices?active_only=true", None)).await;

    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(body["error"], "missing_index");
    assert!(body["create_index_url"].as_str().unwrap().starts_with("https://"));

    // A single-field ordering needs no composite index.
    let (status, _) = send(&app, get_request("/api/v1/notices", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_denied_collection_answers_403() {
    let app = test_app_with_store(MemoryDocumentStore::new().deny_access("notices"));

    let (status, body) = send(&app, get_request("/api/v1/notices", None)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert!(body["message"].as_str().unwrap().contains("notices"));

    // Other collections are unaffected.
    let (status, _) = send(&app, get_request("/api/v1/events", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_notice_is_404() {
    let app = test_app();

    let (status, body) = send(&app, get_request("/api/v1/notices/does-not-exist", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}
