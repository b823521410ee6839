// View Projector - turns a snapshot plus live events into the list and
// counters a role-scoped screen shows. Counters are recomputed by full
// rescan of the projected set, so they can never drift from the list.

use std::collections::HashMap;

use serde::Serialize;

use crate::entities::{
    sort_newest_first, Entity, ItemStatus, LaundryRequest, LaundryStatus, LostItem,
};
use crate::feed::ChangeEvent;

/// Projection of one subscription's visible entities.
pub struct ViewProjection<T: Entity> {
    entries: HashMap<String, T>,
}

impl<T: Entity> ViewProjection<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Seed from a subscription's initial snapshot.
    pub fn from_snapshot(snapshot: Vec<T>) -> Self {
        let mut view = Self::new();
        for record in snapshot {
            view.entries.insert(record.id().to_string(), record);
        }
        view
    }

    /// Fold one delivered event into the projection. After this
    /// returns, `list` and the counters reflect the event.
    pub fn apply(&mut self, event: ChangeEvent<T>) {
        match event {
            ChangeEvent::Added(record) | ChangeEvent::Updated(record) => {
                self.entries.insert(record.id().to_string(), record);
            }
            ChangeEvent::Removed { id } => {
                self.entries.remove(&id);
            }
        }
    }

    /// Visible entities, newest first.
    pub fn list(&self) -> Vec<T> {
        let mut records: Vec<T> = self.entries.values().cloned().collect();
        sort_newest_first(&mut records);
        records
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }
}

impl<T: Entity> Default for ViewProjection<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-status counters for the laundry dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RequestStats {
    pub total: usize,
    pub pending: usize,
    pub in_process: usize,
    pub ready: usize,
    pub delivered: usize,
}

impl RequestStats {
    pub fn count_for(&self, status: LaundryStatus) -> usize {
        match status {
            LaundryStatus::Pending => self.pending,
            LaundryStatus::InProcess => self.in_process,
            LaundryStatus::Ready => self.ready,
            LaundryStatus::Delivered => self.delivered,
        }
    }
}

/// Per-status counters for the lost-and-found board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ItemStats {
    pub total: usize,
    pub available: usize,
    pub claimed: usize,
    pub returned: usize,
}

impl ItemStats {
    pub fn count_for(&self, status: ItemStatus) -> usize {
        match status {
            ItemStatus::Available => self.available,
            ItemStatus::Claimed => self.claimed,
            ItemStatus::Returned => self.returned,
        }
    }
}

impl ViewProjection<LaundryRequest> {
    pub fn stats(&self) -> RequestStats {
        let mut stats = RequestStats {
            total: self.entries.len(),
            ..RequestStats::default()
        };
        for request in self.entries.values() {
            match request.status {
                LaundryStatus::Pending => stats.pending += 1,
                LaundryStatus::InProcess => stats.in_process += 1,
                LaundryStatus::Ready => stats.ready += 1,
                LaundryStatus::Delivered => stats.delivered += 1,
            }
        }
        stats
    }

    pub fn with_status(&self, status: LaundryStatus) -> Vec<LaundryRequest> {
        let mut matching: Vec<LaundryRequest> = self
            .entries
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect();
        sort_newest_first(&mut matching);
        matching
    }
}

impl ViewProjection<LostItem> {
    pub fn stats(&self) -> ItemStats {
        let mut stats = ItemStats {
            total: self.entries.len(),
            ..ItemStats::default()
        };
        for item in self.entries.values() {
            match item.status {
                ItemStatus::Available => stats.available += 1,
                ItemStatus::Claimed => stats.claimed += 1,
                ItemStatus::Returned => stats.returned += 1,
            }
        }
        stats
    }

    pub fn with_status(&self, status: ItemStatus) -> Vec<LostItem> {
        let mut matching: Vec<LostItem> = self
            .entries
            .values()
            .filter(|i| i.status == status)
            .cloned()
            .collect();
        sort_newest_first(&mut matching);
        matching
    }
}
