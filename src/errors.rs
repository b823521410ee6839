// Error taxonomy for the desk core. Every operation returns one of
// these; nothing is swallowed and nothing is retried internally.

use thiserror::Error;

use crate::entities::EntityKind;
use crate::identity::Role;
use crate::store::StoreError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    #[error("role {role} is not allowed to {action}")]
    PermissionDenied { role: Role, action: &'static str },

    #[error("illegal {kind} transition: {from} -> {to}")]
    InvalidTransition {
        kind: EntityKind,
        from: String,
        to: String,
    },

    #[error("no {kind} with id {id}")]
    NotFound { kind: EntityKind, id: String },

    /// Version mismatch on write. The caller must re-read before any
    /// retry; the core never retries on its own.
    #[error("stale write on {id}: expected version {expected}, stored {stored}")]
    ConflictStale {
        id: String,
        expected: u64,
        stored: u64,
    },

    #[error("item {id} already has a live claim")]
    AlreadyClaimed { id: String },

    #[error("item {id} is not available to claim")]
    NotAvailable { id: String },

    #[error("item {id} has no live claim to decide")]
    NotInClaimedState { id: String },

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl CoreError {
    /// Lift a store failure into the core taxonomy, attributing
    /// `NotFound` to the entity kind the caller was working with.
    pub fn from_store(err: StoreError, kind: EntityKind) -> Self {
        match err {
            StoreError::NotFound { id } => CoreError::NotFound { kind, id },
            StoreError::AlreadyExists { id } => CoreError::Validation {
                reason: format!("duplicate {kind} id {id}"),
            },
            StoreError::VersionConflict {
                id,
                expected,
                stored,
            } => CoreError::ConflictStale {
                id,
                expected,
                stored,
            },
            StoreError::Unavailable(reason) => CoreError::UpstreamUnavailable(reason),
        }
    }
}
