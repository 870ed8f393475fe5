//! Profile Handlers
//!
//! `POST /api/users/profile`, `GET /api/users/profile` and
//! `PUT /api/users/profile/onboarding`. All three run behind
//! [`require_principal`](crate::api::auth::require_principal).

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use profile_auth::Principal;
use profile_core::{OnboardingStatus, OnboardingUpdate, ProfileDocument};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use crate::api::auth::require_uid;
use crate::api::error::ApiError;
use crate::api::state::AppState;

/// Create or update the caller's profile
///
/// POST /api/users/profile
///
/// The body is merged into the stored document and the full result is
/// returned.
pub async fn upsert_profile(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProfileDocument>, ApiError> {
    info!("Received request to create/update profile");
    let uid = require_uid(&principal)?;
    let Json(body) = payload?;
    let body = ProfileDocument::from_value(body)?.into_map();

    let profile = state.profiles.upsert(uid, body).await.map_err(|e| {
        error!(uid = %uid, error = %e, "Profile update error");
        ApiError::internal("Failed to update profile", e)
    })?;

    info!(uid = %uid, "Profile updated successfully");
    Ok(Json(profile))
}

/// Fetch the caller's profile
///
/// GET /api/users/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ProfileDocument>, ApiError> {
    info!("Received request to get profile");
    let uid = require_uid(&principal)?;

    let profile = state.profiles.get(uid).await.map_err(|e| {
        error!(uid = %uid, error = %e, "Profile fetch error");
        ApiError::internal("Failed to fetch profile", e)
    })?;

    match profile {
        Some(profile) => {
            info!(uid = %uid, "Profile fetched successfully");
            Ok(Json(profile))
        }
        None => {
            info!(uid = %uid, "Profile not found");
            Err(ApiError::NotFound("Profile not found".into()))
        }
    }
}

/// Record onboarding progress
///
/// PUT /api/users/profile/onboarding
///
/// Only updates an existing profile; a caller without one gets a 500 from
/// the store's "no document" error rather than an implicit create.
pub async fn update_onboarding(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<OnboardingUpdate>, JsonRejection>,
) -> Result<Json<OnboardingStatus>, ApiError> {
    info!("Received request to update onboarding status");
    let uid = require_uid(&principal)?;
    let Json(update) = payload?;

    let status = state
        .profiles
        .update_onboarding(uid, &update)
        .await
        .map_err(|e| {
            error!(uid = %uid, error = %e, "Onboarding update error");
            ApiError::internal("Failed to update onboarding status", e)
        })?;

    info!(
        uid = %uid,
        step = %update.step,
        completed = update.completed,
        "Onboarding status updated successfully"
    );
    Ok(Json(status))
}
