//! Verifier trait and bearer-header handling

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{AuthError, Result};
use crate::types::Principal;

const BEARER_PREFIX: &str = "Bearer ";

/// Trait for token verifiers
///
/// Each implementation checks a raw bearer token against one identity
/// provider and extracts the principal.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a token and extract the principal
    ///
    /// # Returns
    /// * `Ok(Principal)` - Verified identity
    /// * `Err(AuthError)` - If the token is invalid or the provider failed
    async fn verify(&self, token: &str) -> Result<Principal>;

    /// Get a description of this verifier (for logging)
    fn description(&self) -> &str {
        "token verifier"
    }
}

/// Extract the token from an `Authorization` header value
pub fn extract_bearer(header: Option<&str>) -> Result<&str> {
    let token = header
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .unwrap_or_default();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Resolve a principal from an `Authorization` header value
///
/// A missing token fails before the verifier is called, and a principal whose
/// expiry has already passed is rejected. Failures are logged here with their
/// reason.
pub async fn authenticate(verifier: &dyn TokenVerifier, header: Option<&str>) -> Result<Principal> {
    let token = extract_bearer(header).inspect_err(|_| {
        debug!("Request has no bearer token");
    })?;

    let verified = verifier.verify(token).await.and_then(|principal| {
        if principal.is_expired() {
            Err(AuthError::Expired)
        } else {
            Ok(principal)
        }
    });

    match verified {
        Ok(principal) => {
            debug!(
                verifier = verifier.description(),
                uid = %principal.uid,
                "Token verified"
            );
            Ok(principal)
        }
        Err(e) => {
            warn!(
                verifier = verifier.description(),
                error = %e,
                "Token verification failed"
            );
            Err(e)
        }
    }
}
