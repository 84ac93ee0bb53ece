//! Common test utilities for integration tests.
//!
//! Every test builds its own router over the in-memory document store and
//! blob operator, so no external services are needed.

// Helpers are shared across test binaries; not every binary uses all of them.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use bpjp_api::{
    app::{create_app, AppState},
    config::Config,
    services::{identity::LocalIdentityProvider, recommendation::Recommender},
};
use fake::{faker::internet::en::SafeEmail, Fake};
use persistence::store::MemoryDocumentStore;
use persistence::{BlobStorage, DocumentStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@bpjp.org";
pub const PASSWORD: &str = "donate-2024";
pub const FILES_BASE_URL: &str = "http://files.test";

/// Test configuration: memory backends, no rate limiting, one admin email.
pub fn test_config() -> Config {
    let mut config = Config::load_for_test(&[("security.rate_limit_per_minute", "0")])
        .expect("Failed to load test config");
    config.auth.admin_emails = vec![ADMIN_EMAIL.to_string()];
    config
}

pub fn test_state(config: Config, store: Arc<dyn DocumentStore>) -> AppState {
    let blobs = BlobStorage::in_memory(FILES_BASE_URL).expect("memory blob storage");
    AppState::new(
        config,
        store,
        blobs,
        Arc::new(LocalIdentityProvider::new()),
        Recommender::default(),
    )
    .expect("Failed to build app state")
}

/// Router over an empty, permissive memory store.
pub fn test_app() -> Router {
    test_app_with_store(MemoryDocumentStore::new())
}

/// Router over a store with custom access rules.
pub fn test_app_with_store(store: MemoryDocumentStore) -> Router {
    create_app(test_state(test_config(), Arc::new(store)))
}

/// Router plus a handle on its store, for seeding records the API cannot
/// create.
pub fn test_app_sharing_store() -> (Router, Arc<MemoryDocumentStore>) {
    let store = Arc::new(MemoryDocumentStore::new());
    let app = create_app(test_state(test_config(), store.clone()));
    (app, store)
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn delete_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Sends a request and returns the status with the parsed JSON body
/// (`Value::Null` for empty or non-JSON bodies).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

pub fn random_email() -> String {
    SafeEmail().fake()
}

/// Signs up `email` and returns the access token.
pub async fn signup(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/auth/signup",
            None,
            json!({ "email": email, "password": PASSWORD, "display_name": "Test User" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
    body["access_token"].as_str().unwrap().to_string()
}

pub async fn admin_token(app: &Router) -> String {
    signup(app, ADMIN_EMAIL).await
}

pub async fn member_token(app: &Router) -> String {
    signup(app, "donor@bpjp.org").await
}

/// Creates a record through the API as admin and returns its JSON.
pub async fn create(app: &Router, token: &str, uri: &str, body: Value) -> Value {
    let (status, created) = send(app, json_request(Method::POST, uri, Some(token), body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", created);
    created
}

pub fn campaign_body(title: &str, status: &str) -> Value {
    json!({
        "title": title,
        "description": format!("{} for flood-affected families", title),
        "goal_amount": 50000.0,
        "raised_amount": 12000.0,
        "start_date": "2024-06-01",
        "end_date": "2024-08-31",
        "status": status
    })
}

pub fn notice_body(title: &str, active: bool, popup: bool) -> Value {
    json!({
        "title": title,
        "content": "Collection points open at 9am",
        "active": active,
        "popup": popup
    })
}

/// Multipart body with a JSON `payload` part and a `file` part.
pub fn multipart_request(
    method: Method,
    uri: &str,
    token: &str,
    payload: Value,
    file_name: &str,
    file_bytes: &[u8],
) -> Request<Body> {
    let boundary = "bpjp-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"payload\"\r\n\
             Content-Type: application/json\r\n\r\n{p}\r\n",
            b = boundary,
            p = payload
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
             Content-Type: image/png\r\n\r\n",
            b = boundary,
            f = file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(file_bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}
