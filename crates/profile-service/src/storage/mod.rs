//! Storage abstraction for profile documents
//!
//! One document per subject identifier in a single `users` collection. The
//! trait exposes exactly three primitives:
//! - `get`: read, with absence reported as `None`
//! - `set`: merge (or overwrite) and create the document if needed
//! - `update`: field-path update that fails when the document is missing
//!
//! There is no delete. Backends do not cache or retry.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use async_trait::async_trait;
use profile_core::{fields, FieldUpdates, ProfileDocument};
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::info;

/// Collection holding the profile documents
pub const PROFILE_COLLECTION: &str = "users";

/// `users/<uid>`, used in logs and error messages
pub fn document_path(uid: &str) -> String {
    format!("{}/{}", PROFILE_COLLECTION, uid)
}

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("No document to update: {0}")]
    NoDocument(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

impl From<profile_core::CoreError> for StorageError {
    fn from(err: profile_core::CoreError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// How `set` treats an existing document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOptions {
    /// Merge into the existing document instead of replacing it
    pub merge: bool,
}

impl SetOptions {
    pub fn merge() -> Self {
        Self { merge: true }
    }

    pub fn overwrite() -> Self {
        Self { merge: false }
    }

    /// Resulting document for a write onto `existing`
    ///
    /// A merge never replaces a `createdAt` the document already has, so two
    /// writers that both saw no document cannot move the creation time.
    pub fn apply(&self, existing: Option<ProfileDocument>, mut patch: Map<String, Value>) -> ProfileDocument {
        match existing {
            Some(mut doc) if self.merge => {
                if doc.as_map().contains_key(fields::CREATED_AT) {
                    patch.remove(fields::CREATED_AT);
                }
                doc.merge(patch);
                doc
            }
            _ => ProfileDocument::from_map(patch),
        }
    }
}

impl Default for SetOptions {
    fn default() -> Self {
        Self::merge()
    }
}

/// Storage backend trait for profile documents
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait ProfileStore: Send + Sync + Debug {
    /// Short backend name reported by the readiness endpoint
    fn backend(&self) -> &'static str;

    /// Check that the backend is reachable
    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Read a profile
    async fn get(&self, uid: &str) -> Result<Option<ProfileDocument>, StorageError>;

    /// Write a profile, creating it if absent
    async fn set(
        &self,
        uid: &str,
        patch: Map<String, Value>,
        options: SetOptions,
    ) -> Result<(), StorageError>;

    /// Update fields of an existing profile
    ///
    /// Fails with [`StorageError::NoDocument`] when there is nothing to update.
    async fn update(&self, uid: &str, updates: &FieldUpdates) -> Result<(), StorageError>;
}

/// Open the configured backend
///
/// PostgreSQL is used when a database URL is given and the `postgres`
/// feature is compiled in; otherwise profiles live in memory.
pub async fn connect(database_url: Option<&str>) -> Result<Arc<dyn ProfileStore>, StorageError> {
    match database_url {
        #[cfg(feature = "postgres")]
        Some(url) => Ok(Arc::new(PostgresStore::new(url).await?)),
        #[cfg(not(feature = "postgres"))]
        Some(_) => {
            tracing::warn!("DATABASE_URL is set but the postgres feature is disabled; using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        None => {
            info!("Using in-memory profile store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
