//! HTTP Tests for the Profile Service
//!
//! These drive the full router with `oneshot` requests:
//! - Authentication happens before any store access
//! - Profiles are created, merged and read back per caller
//! - Onboarding updates only touch existing profiles
//! - Store failures surface as 500 with details

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use profile_auth::{Principal, StaticTokenVerifier};
use profile_core::{FieldUpdates, ManualClock, ProfileDocument, Timestamp};
use profile_service::{
    create_router, AppState, MemoryStore, ProfileService, ProfileStore, SetOptions, StorageError,
};

const START_MILLIS: i64 = 1_760_000_000_000;

// =============================================================================
// Test Helpers
// =============================================================================

/// Memory store that counts every data call
#[derive(Debug, Default)]
struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProfileStore for CountingStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, uid: &str) -> Result<Option<ProfileDocument>, StorageError> {
        self.hit();
        self.inner.get(uid).await
    }

    async fn set(
        &self,
        uid: &str,
        patch: Map<String, Value>,
        options: SetOptions,
    ) -> Result<(), StorageError> {
        self.hit();
        self.inner.set(uid, patch, options).await
    }

    async fn update(&self, uid: &str, updates: &FieldUpdates) -> Result<(), StorageError> {
        self.hit();
        self.inner.update(uid, updates).await
    }
}

/// Store whose backend is unreachable
#[derive(Debug)]
struct FailingStore;

#[async_trait]
impl ProfileStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }

    async fn get(&self, _uid: &str) -> Result<Option<ProfileDocument>, StorageError> {
        Err(StorageError::Database("deadline exceeded".into()))
    }

    async fn set(
        &self,
        _uid: &str,
        _patch: Map<String, Value>,
        _options: SetOptions,
    ) -> Result<(), StorageError> {
        Err(StorageError::Database("deadline exceeded".into()))
    }

    async fn update(&self, _uid: &str, _updates: &FieldUpdates) -> Result<(), StorageError> {
        Err(StorageError::Database("deadline exceeded".into()))
    }
}

struct TestApp {
    router: Router,
    store: Arc<CountingStore>,
    clock: Arc<ManualClock>,
}

fn verifier() -> StaticTokenVerifier {
    StaticTokenVerifier::new()
        .with_token("token-u1", Principal::new("u1").with_email("a@b.com"))
        .with_token("token-u2", Principal::new("u2"))
        .with_token("token-blank", Principal::new(""))
}

fn timestamp(offset_secs: i64) -> String {
    Timestamp::from_millis(START_MILLIS + offset_secs * 1000)
        .expect("valid test timestamp")
        .to_rfc3339()
}

fn app() -> TestApp {
    let store = Arc::new(CountingStore::default());
    let clock = Arc::new(ManualClock::at(
        Timestamp::from_millis(START_MILLIS).expect("valid test timestamp"),
    ));
    let profiles = ProfileService::with_clock(store.clone(), clock.clone());
    let state = Arc::new(AppState::new(Arc::new(verifier()), profiles));

    TestApp {
        router: create_router(state),
        store,
        clock,
    }
}

fn failing_app() -> Router {
    let profiles = ProfileService::new(Arc::new(FailingStore));
    create_router(Arc::new(AppState::new(Arc::new(verifier()), profiles)))
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn post_profile(router: &Router, token: &str, body: Value) -> (StatusCode, Value) {
    send(
        router,
        request(Method::POST, "/api/users/profile", Some(token), Some(&body.to_string())),
    )
    .await
}

async fn get_profile(router: &Router, token: &str) -> (StatusCode, Value) {
    send(router, request(Method::GET, "/api/users/profile", Some(token), None)).await
}

async fn put_onboarding(router: &Router, token: &str, body: Value) -> (StatusCode, Value) {
    send(
        router,
        request(
            Method::PUT,
            "/api/users/profile/onboarding",
            Some(token),
            Some(&body.to_string()),
        ),
    )
    .await
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app.router, request(Method::GET, "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_ready_with_memory_store() {
    let app = app();
    let (status, body) = send(&app.router, request(Method::GET, "/ready", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ready": true, "backend": "memory" }));
}

#[tokio::test]
async fn test_ready_reports_unreachable_store() {
    let router = failing_app();
    let (status, body) = send(&router, request(Method::GET, "/ready", None, None)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ready"], json!(false));
    assert_eq!(body["backend"], json!("failing"));
    assert_eq!(body["error"], json!("Connection error: connection refused"));
}

#[tokio::test]
async fn test_unknown_route() {
    let app = app();
    let (status, body) = send(&app.router, request(Method::GET, "/api/unknown", None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/users/profile")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    assert_eq!(app.store.calls(), 0);
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_missing_header_rejected_before_store() {
    let app = app();

    let (status, body) = send(
        &app.router,
        request(Method::POST, "/api/users/profile", None, Some("not json")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = app();

    let (status, body) = get_profile(&app.router, "invalid").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));

    let (status, _) = put_onboarding(&app.router, "invalid", json!({ "step": 1, "completed": false })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let app = app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/users/profile")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_blank_subject_is_bad_request() {
    let app = app();

    let (status, body) = get_profile(&app.router, "token-blank").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "User ID is missing" }));

    let (status, body) = post_profile(&app.router, "token-blank", json!({ "email": "x@y.z" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "User ID is missing" }));

    let (status, body) =
        put_onboarding(&app.router, "token-blank", json!({ "step": 2, "completed": true })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "User ID is missing" }));

    assert_eq!(app.store.calls(), 0);
}

// =============================================================================
// Create / Update Profile
// =============================================================================

#[tokio::test]
async fn test_first_post_creates_profile() {
    let app = app();

    let (status, body) = post_profile(&app.router, "token-u1", json!({ "email": "a@b.com" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "email": "a@b.com",
            "uid": "u1",
            "createdAt": timestamp(0),
            "lastUpdated": timestamp(0)
        })
    );
}

#[tokio::test]
async fn test_second_post_merges_and_keeps_created_at() {
    let app = app();
    post_profile(
        &app.router,
        "token-u1",
        json!({ "email": "a@b.com", "companyDetails": { "name": "Acme" } }),
    )
    .await;

    app.clock.advance(Duration::seconds(90));
    let (status, body) = post_profile(
        &app.router,
        "token-u1",
        json!({
            "companyDetails": { "industry": "Tech" },
            "strategicGoals": ["growth"],
            "createdAt": "1999-01-01T00:00:00.000Z"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], json!("a@b.com"));
    assert_eq!(body["companyDetails"], json!({ "name": "Acme", "industry": "Tech" }));
    assert_eq!(body["strategicGoals"], json!(["growth"]));
    assert_eq!(body["createdAt"], json!(timestamp(0)));
    assert_eq!(body["lastUpdated"], json!(timestamp(90)));
}

#[tokio::test]
async fn test_body_cannot_claim_another_uid() {
    let app = app();

    let (status, body) = post_profile(&app.router, "token-u1", json!({ "uid": "u2" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uid"], json!("u1"));

    let (status, _) = get_profile(&app.router, "token-u2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_object_body_rejected() {
    let app = app();

    let (status, body) = post_profile(&app.router, "token-u1", json!(["a", "b"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid request body" }));

    let (status, body) = send(
        &app.router,
        request(Method::POST, "/api/users/profile", Some("token-u1"), Some("{\"email\":")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid request body" }));

    let unlabelled = Request::builder()
        .method(Method::POST)
        .uri("/api/users/profile")
        .header(header::AUTHORIZATION, "Bearer token-u1")
        .body(Body::from("{\"email\":\"a@b.com\"}"))
        .unwrap();
    let (status, body) = send(&app.router, unlabelled).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid request body" }));

    let (status, _) = get_profile(&app.router, "token-u1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_store_failure() {
    let router = failing_app();

    let (status, body) = post_profile(&router, "token-u1", json!({ "email": "a@b.com" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "error": "Failed to update profile",
            "details": "Database error: deadline exceeded"
        })
    );
}

// =============================================================================
// Read Profile
// =============================================================================

#[tokio::test]
async fn test_get_unknown_profile() {
    let app = app();

    let (status, body) = get_profile(&app.router, "token-u2").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Profile not found" }));
}

#[tokio::test]
async fn test_get_returns_stored_document() {
    let app = app();
    let (_, created) = post_profile(&app.router, "token-u1", json!({ "email": "a@b.com" })).await;

    let (status, body) = get_profile(&app.router, "token-u1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);
}

#[tokio::test]
async fn test_profiles_are_isolated_per_caller() {
    let app = app();
    post_profile(&app.router, "token-u1", json!({ "email": "a@b.com" })).await;
    post_profile(&app.router, "token-u2", json!({ "email": "c@d.com" })).await;

    let (_, first) = get_profile(&app.router, "token-u1").await;
    let (_, second) = get_profile(&app.router, "token-u2").await;

    assert_eq!(first["email"], json!("a@b.com"));
    assert_eq!(second["email"], json!("c@d.com"));
    assert_eq!(second["uid"], json!("u2"));
}

#[tokio::test]
async fn test_get_store_failure() {
    let router = failing_app();

    let (status, body) = get_profile(&router, "token-u1").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Failed to fetch profile"));
    assert_eq!(body["details"], json!("Database error: deadline exceeded"));
}

// =============================================================================
// Onboarding
// =============================================================================

#[tokio::test]
async fn test_onboarding_update() {
    let app = app();
    post_profile(&app.router, "token-u1", json!({ "email": "a@b.com" })).await;
    app.clock.advance(Duration::seconds(10));

    let (status, body) =
        put_onboarding(&app.router, "token-u1", json!({ "step": 2, "completed": true })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "currentStep": 2, "onboardingCompleted": true }));

    let (_, profile) = get_profile(&app.router, "token-u1").await;
    assert_eq!(profile["onboarding"], json!({ "currentStep": 2 }));
    assert_eq!(profile["onboardingCompleted"], json!(true));
    assert_eq!(profile["lastUpdated"], json!(timestamp(10)));
    assert_eq!(profile["createdAt"], json!(timestamp(0)));
    assert_eq!(profile["email"], json!("a@b.com"));
}

#[tokio::test]
async fn test_onboarding_keeps_sibling_fields() {
    let app = app();
    post_profile(
        &app.router,
        "token-u1",
        json!({ "onboarding": { "currentStep": "company", "skipped": ["goals"] } }),
    )
    .await;

    let (status, _) =
        put_onboarding(&app.router, "token-u1", json!({ "step": "review", "completed": false })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, profile) = get_profile(&app.router, "token-u1").await;
    assert_eq!(
        profile["onboarding"],
        json!({ "currentStep": "review", "skipped": ["goals"] })
    );
    assert_eq!(profile["onboardingCompleted"], json!(false));
}

#[tokio::test]
async fn test_onboarding_without_profile_fails() {
    let app = app();

    let (status, body) =
        put_onboarding(&app.router, "token-u1", json!({ "step": 1, "completed": false })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "error": "Failed to update onboarding status",
            "details": "No document to update: users/u1"
        })
    );

    let (status, _) = get_profile(&app.router, "token-u1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_onboarding_rejects_malformed_body() {
    let app = app();
    post_profile(&app.router, "token-u1", json!({})).await;

    let (status, body) = put_onboarding(&app.router, "token-u1", json!({ "step": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid request body" }));

    let (status, body) =
        put_onboarding(&app.router, "token-u1", json!({ "step": 1, "completed": "yes" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid request body" }));
}
