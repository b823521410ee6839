use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, EntityKind};

/// Lost item lifecycle. `Returned` is terminal; a rejected claim sends
/// the item back to `Available` where it can be claimed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    Available,
    Claimed,
    Returned,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 3] = [
        ItemStatus::Available,
        ItemStatus::Claimed,
        ItemStatus::Returned,
    ];
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Available => write!(f, "available"),
            ItemStatus::Claimed => write!(f, "claimed"),
            ItemStatus::Returned => write!(f, "returned"),
        }
    }
}

/// A live (unresolved) claim on an item. Present iff the item is in
/// `Claimed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    pub claimant_id: String,
    pub justification: String,
    pub contact_info: String,
    pub claimed_at: DateTime<Utc>,
}

impl Claim {
    pub fn new(
        claimant_id: impl Into<String>,
        justification: impl Into<String>,
        contact_info: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            claimant_id: claimant_id.into(),
            justification: justification.into(),
            contact_info: contact_info.into(),
            claimed_at: Utc::now(),
        }
    }
}

/// Outcome of a staff decision on a claim. The decided claim moves in
/// here so the live `claim` slot is empty again while the audit trail
/// survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub decided_by: String,
    pub approved: bool,
    pub notes: Option<String>,
    pub decided_at: DateTime<Utc>,
    /// Stamped only on approval, when the item is handed back.
    pub returned_at: Option<DateTime<Utc>>,
    pub claim: Claim,
}

/// An item reported found by a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostItem {
    pub id: String,
    pub description: String,
    pub category: String,
    pub location: String,
    /// Handler who reported the find.
    pub reported_by: String,
    /// Opaque object-store reference to a photo, carried untouched.
    pub photo_ref: Option<String>,
    pub status: ItemStatus,
    /// Live claim; invariant: `Some` iff `status == Claimed`.
    pub claim: Option<Claim>,
    /// Most recent decision, retained across re-claims for audit.
    pub verification: Option<Verification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl LostItem {
    /// New item in `Available` with no claim attached.
    pub fn new(
        reported_by: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        location: impl Into<String>,
        photo_ref: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            category: category.into(),
            location: location.into(),
            reported_by: reported_by.into(),
            photo_ref,
            status: ItemStatus::Available,
            claim: None,
            verification: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn has_live_claim(&self) -> bool {
        self.claim.is_some()
    }
}

impl Entity for LostItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::LostItem
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
