//! In-memory storage backend
//!
//! Default storage implementation using an in-memory hashmap.
//! Suitable for development and tests. Data is lost on restart.

use async_trait::async_trait;
use profile_core::{FieldUpdates, ProfileDocument};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::{document_path, ProfileStore, SetOptions, StorageError};

/// In-memory profile store implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, ProfileDocument>>,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles
    pub fn len(&self) -> usize {
        self.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, ProfileDocument>>, StorageError> {
        self.documents
            .read()
            .map_err(|_| StorageError::Database("profile store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, ProfileDocument>>, StorageError> {
        self.documents
            .write()
            .map_err(|_| StorageError::Database("profile store lock poisoned".into()))
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, uid: &str) -> Result<Option<ProfileDocument>, StorageError> {
        Ok(self.read()?.get(uid).cloned())
    }

    async fn set(
        &self,
        uid: &str,
        patch: Map<String, Value>,
        options: SetOptions,
    ) -> Result<(), StorageError> {
        let mut documents = self.write()?;
        let existing = documents.remove(uid);
        let created = existing.is_none();
        documents.insert(uid.to_string(), options.apply(existing, patch));

        debug!(path = %document_path(uid), created, merge = options.merge, "Wrote profile");
        Ok(())
    }

    async fn update(&self, uid: &str, updates: &FieldUpdates) -> Result<(), StorageError> {
        let mut documents = self.write()?;
        let doc = documents
            .get_mut(uid)
            .ok_or_else(|| StorageError::NoDocument(document_path(uid)))?;
        doc.apply(updates);

        debug!(path = %document_path(uid), fields = updates.len(), "Updated profile fields");
        Ok(())
    }
}
