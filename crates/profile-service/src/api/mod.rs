//! API module for the profile service

pub mod auth;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{error, Level};

use error::{ApiError, ErrorResponse};
use state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check response
#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
    })
}

/// Readiness check endpoint
///
/// GET /ready
pub async fn ready(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ReadyResponse>) {
    let store = state.profiles.store();
    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadyResponse {
                ready: true,
                backend: store.backend().into(),
                error: None,
            }),
        ),
        Err(e) => {
            error!(backend = store.backend(), error = %e, "Store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse {
                    ready: false,
                    backend: store.backend().into(),
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".into())
}

/// Log a handler panic and answer a generic 500
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };

    error!(panic = %message, "Request handler panicked");

    let body = ErrorResponse {
        error: "Something broke!".into(),
        details: None,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration for the browser front end
    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    // Method, path, status and latency in milliseconds for every request
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let profile_routes = Router::new()
        .route(
            "/profile",
            post(handlers::upsert_profile).get(handlers::get_profile),
        )
        .route("/profile/onboarding", put(handlers::update_onboarding))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_principal,
        ));

    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Profile endpoints
        .nest("/api/users", profile_routes)
        .fallback(not_found)
        // Middleware
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(trace)
        .layer(cors)
        .with_state(state)
}
