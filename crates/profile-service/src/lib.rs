//! Profile Service
//!
//! Stores one onboarding profile document per authenticated user.
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check, pings the document store
//! - `POST /api/users/profile` - Create the caller's profile or merge into it
//! - `GET /api/users/profile` - Read the caller's profile
//! - `PUT /api/users/profile/onboarding` - Record onboarding progress
//!
//! Every `/api/users` route requires `Authorization: Bearer <Firebase ID token>`.
//! The verified subject id is the document key, so a caller only ever sees
//! their own profile.

pub mod api;
pub mod config;
pub mod core;
pub mod storage;

pub use api::create_router;
pub use api::error::ApiError;
pub use api::state::AppState;
pub use config::{AuthConfig, ConfigError, ServiceConfig};
pub use core::ProfileService;
pub use storage::{connect, MemoryStore, ProfileStore, SetOptions, StorageError};
