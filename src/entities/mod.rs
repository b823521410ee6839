// Workflow entities - versioned records for the two desk services
// Every mutation flows through the transition tables or the claim
// arbitrator; nothing edits fields behind the store's back.

pub mod laundry;
pub mod lost_item;

pub use laundry::{LaundryRequest, LaundryStatus};
pub use lost_item::{Claim, ItemStatus, LostItem, Verification};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two record kinds the desk coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    LaundryRequest,
    LostItem,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::LaundryRequest => write!(f, "laundry-request"),
            EntityKind::LostItem => write!(f, "lost-item"),
        }
    }
}

/// Common surface of a versioned desk record.
///
/// The store owns the version counter and the `updated_at` stamp; entity
/// constructors leave version at 0 and the store assigns 1 on create.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn kind(&self) -> EntityKind;
    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);
    fn created_at(&self) -> DateTime<Utc>;
    fn touch(&mut self, now: DateTime<Utc>);
}

/// Newest-first ordering used by snapshots and projected lists,
/// matching the desk's dashboard ordering. Ties break on id so the
/// order is stable across rescans.
pub fn sort_newest_first<T: Entity>(records: &mut [T]) {
    records.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.id().cmp(b.id()))
    });
}
