//! Bearer-token authentication middleware
//!
//! Runs before every profile handler. The verified [`Principal`] is stored
//! in the request extensions; anything else ends the request with 401
//! before the store is touched.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use profile_auth::{authenticate, Principal};
use std::sync::Arc;
use tracing::info;

use crate::api::error::ApiError;
use crate::api::state::AppState;

/// Token verification middleware
pub async fn require_principal(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let principal = authenticate(state.verifier.as_ref(), header.as_deref())
        .await
        .map_err(|_| ApiError::Unauthorized)?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Subject id of the authenticated user, or 400 when the provider gave none
pub fn require_uid(principal: &Principal) -> Result<&str, ApiError> {
    principal.subject().ok_or_else(|| {
        info!("User ID is missing");
        ApiError::BadRequest("User ID is missing".into())
    })
}
