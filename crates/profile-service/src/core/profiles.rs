//! Profile Service
//!
//! The three profile operations, independent of HTTP:
//! 1. `upsert`: create-or-merge, stamping `createdAt` once and `lastUpdated` always
//! 2. `get`: read by subject id
//! 3. `update_onboarding`: must-exist update of the onboarding fields

use profile_core::{
    upsert_patch, Clock, OnboardingStatus, OnboardingUpdate, ProfileDocument, SystemClock,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::storage::{document_path, ProfileStore, SetOptions, StorageError};

/// Profile operations over a store and a clock
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    /// Service using the system clock
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(store: Arc<dyn ProfileStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    /// Create the profile or merge `body` into it, returning the stored result
    pub async fn upsert(
        &self,
        uid: &str,
        body: Map<String, Value>,
    ) -> Result<ProfileDocument, StorageError> {
        let is_new = self.store.get(uid).await?.is_none();
        let patch = upsert_patch(body, uid, self.clock.now(), is_new);

        self.store.set(uid, patch, SetOptions::merge()).await?;
        debug!(path = %document_path(uid), created = is_new, "Profile written");

        self.store.get(uid).await?.ok_or_else(|| {
            StorageError::Database(format!("{} missing after write", document_path(uid)))
        })
    }

    /// Read a profile; `None` when it was never written
    pub async fn get(&self, uid: &str) -> Result<Option<ProfileDocument>, StorageError> {
        self.store.get(uid).await
    }

    /// Record onboarding progress on an existing profile
    pub async fn update_onboarding(
        &self,
        uid: &str,
        update: &OnboardingUpdate,
    ) -> Result<OnboardingStatus, StorageError> {
        let updates = update.field_updates(self.clock.now());
        self.store.update(uid, &updates).await?;
        Ok(update.status())
    }
}
