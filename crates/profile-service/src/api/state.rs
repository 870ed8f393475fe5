//! Shared application state

use profile_auth::TokenVerifier;
use std::sync::Arc;

use crate::core::ProfileService;

/// Process-wide handles shared across handlers, read-only after startup
pub struct AppState {
    /// Verifies bearer tokens against the identity provider
    pub verifier: Arc<dyn TokenVerifier>,
    /// Profile operations over the document store
    pub profiles: ProfileService,
}

impl AppState {
    pub fn new(verifier: Arc<dyn TokenVerifier>, profiles: ProfileService) -> Self {
        Self { verifier, profiles }
    }
}
