use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, EntityKind};

/// Laundry request lifecycle. Linear and forward-only; `Delivered` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaundryStatus {
    Pending,
    InProcess,
    Ready,
    Delivered,
}

impl LaundryStatus {
    pub const ALL: [LaundryStatus; 4] = [
        LaundryStatus::Pending,
        LaundryStatus::InProcess,
        LaundryStatus::Ready,
        LaundryStatus::Delivered,
    ];
}

impl std::fmt::Display for LaundryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaundryStatus::Pending => write!(f, "pending"),
            LaundryStatus::InProcess => write!(f, "in-process"),
            LaundryStatus::Ready => write!(f, "ready"),
            LaundryStatus::Delivered => write!(f, "delivered"),
        }
    }
}

/// A requester's laundry service request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaundryRequest {
    pub id: String,
    /// Requester who owns this request; only they (and staff) see it.
    pub owner_id: String,
    /// Item descriptions in the order handed over. Never empty.
    pub items: Vec<String>,
    pub status: LaundryStatus,
    pub pickup_at: DateTime<Utc>,
    pub notes: Option<String>,
    /// Stamped when the request enters `Delivered`.
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl LaundryRequest {
    /// New request in `Pending`; requests are never created in any other
    /// state.
    pub fn new(
        owner_id: impl Into<String>,
        items: Vec<String>,
        pickup_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            items,
            status: LaundryStatus::Pending,
            pickup_at,
            notes,
            delivered_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}

impl Entity for LaundryRequest {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::LaundryRequest
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
