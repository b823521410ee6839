// Sessions and role scopes - identity is passed into every operation
// explicitly; the core never reads ambient auth state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::{LaundryRequest, LostItem};
use crate::errors::CoreError;

/// Caller roles, as reported by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Resident who submits laundry requests and claims found items.
    Requester,
    /// Desk staff who run the laundry workflow and report found items.
    Handler,
    /// Admin role; everything a handler can do, plus oversight.
    Auditor,
}

impl Role {
    /// Handlers and auditors manage workflows; requesters only own their
    /// side of them.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Handler | Role::Auditor)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Requester => write!(f, "requester"),
            Role::Handler => write!(f, "handler"),
            Role::Auditor => write!(f, "auditor"),
        }
    }
}

/// An authenticated caller. Supplied by the identity provider and
/// trusted as-is for role checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub actor_id: String,
    pub role: Role,
}

impl Session {
    pub fn new(actor_id: impl Into<String>, role: Role) -> Self {
        Self {
            actor_id: actor_id.into(),
            role,
        }
    }
}

/// Visibility scope derived from a session. One declarative predicate
/// per role instead of per-screen filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// A requester sees only their own laundry requests. Found items are
    /// visible to everyone so they can be claimed.
    Requester { actor_id: String },
    /// Staff see everything.
    Staff,
}

impl Scope {
    pub fn for_session(session: &Session) -> Self {
        if session.role.is_staff() {
            Scope::Staff
        } else {
            Scope::Requester {
                actor_id: session.actor_id.clone(),
            }
        }
    }

    pub fn allows_request(&self, request: &LaundryRequest) -> bool {
        match self {
            Scope::Staff => true,
            Scope::Requester { actor_id } => request.owner_id == *actor_id,
        }
    }

    pub fn allows_item(&self, _item: &LostItem) -> bool {
        true
    }
}

/// Port to the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the current caller. Fails with `UpstreamUnavailable` when
    /// the provider cannot be reached.
    async fn current_session(&self) -> Result<Session, CoreError>;
}

/// Fixed-session provider used by the demo binary and tests.
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    session: Session,
}

impl StaticIdentityProvider {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_session(&self) -> Result<Session, CoreError> {
        Ok(self.session.clone())
    }
}
