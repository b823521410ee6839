// Hostel Desk - live workflow & claim-arbitration core
// This exposes the engine components for the UI/controller layer and
// for integration tests.

pub mod claims;
pub mod config;
pub mod coordinator;
pub mod entities;
pub mod errors;
pub mod feed;
pub mod identity;
pub mod store;
pub mod telemetry;
pub mod transitions;
pub mod views;

// Re-export key types for easy access
pub use claims::ClaimArbitrator;
pub use config::HostelDeskConfig;
pub use coordinator::DeskCoordinator;
pub use entities::{
    Claim, Entity, EntityKind, ItemStatus, LaundryRequest, LaundryStatus, LostItem, Verification,
};
pub use errors::CoreError;
pub use feed::{ChangeEvent, ChangeFeed, Predicate, Subscription};
pub use identity::{IdentityProvider, Role, Scope, Session, StaticIdentityProvider};
pub use store::{EntityStore, MemoryStore, StoreError};
pub use telemetry::{desk_span, generate_correlation_id, init_telemetry};
pub use transitions::{
    item_next, laundry_next, validate_item_transition, validate_laundry_transition,
    TransitionCheck,
};
pub use views::{ItemStats, RequestStats, ViewProjection};
