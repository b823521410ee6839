// Entity Store port - versioned key-by-id storage with compare-and-swap
// writes. The in-memory adapter lives in `memory`; a durable backend
// would implement the same trait.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::entities::Entity;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("no record with id {id}")]
    NotFound { id: String },

    #[error("record {id} already exists")]
    AlreadyExists { id: String },

    /// Optimistic-concurrency loss. The caller raced another writer and
    /// must re-read before deciding anything.
    #[error("version conflict on {id}: expected {expected}, stored {stored}")]
    VersionConflict {
        id: String,
        expected: u64,
        stored: u64,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Versioned record storage with CAS write semantics.
///
/// Every successful write bumps `version`, stamps `updated_at`, and is
/// visible to the change feed before the call returns.
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    async fn get(&self, id: &str) -> Result<T, StoreError>;

    /// Insert a new record. The store assigns version 1.
    async fn create(&self, record: T) -> Result<T, StoreError>;

    /// Replace the record `next.id()` refers to, but only if the stored
    /// version still equals `expected_version`. On mismatch nothing is
    /// written and `VersionConflict` is returned.
    async fn put(&self, next: T, expected_version: u64) -> Result<T, StoreError>;
}
