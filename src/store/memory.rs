use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::{EntityStore, StoreError};
use crate::entities::{sort_newest_first, Entity};
use crate::feed::{ChangeFeed, Predicate, Subscription};

/// In-memory store adapter with an attached change feed.
///
/// Records and the feed registry are guarded so that commit and fan-out
/// form one critical section per store: a subscriber that snapshots
/// under the record lock can never miss a commit or see one twice.
pub struct MemoryStore<T: Entity> {
    records: Mutex<HashMap<String, T>>,
    feed: Arc<ChangeFeed<T>>,
}

impl<T: Entity> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            feed: Arc::new(ChangeFeed::new()),
        }
    }

    fn lock_records(&self) -> Result<MutexGuard<'_, HashMap<String, T>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("record lock poisoned".to_string()))
    }

    /// Subscribe with a scope predicate.
    ///
    /// Returns the current matching records (newest first) plus a live
    /// handle that will observe exactly the mutations committed after
    /// this snapshot, in per-entity commit order. Snapshot and
    /// registration happen under the record lock, so there is no gap
    /// and no overlap between the two.
    pub fn subscribe(
        &self,
        predicate: Predicate<T>,
    ) -> Result<(Vec<T>, Subscription<T>), StoreError> {
        let records = self.lock_records()?;
        let mut snapshot: Vec<T> = records
            .values()
            .filter(|record| predicate.as_ref()(record))
            .cloned()
            .collect();
        sort_newest_first(&mut snapshot);
        let (id, rx) = self.feed.register(predicate);
        drop(records);
        debug!(subscription = %id, snapshot_len = snapshot.len(), "store subscription opened");
        Ok((snapshot, Subscription::new(id, rx, Arc::clone(&self.feed))))
    }

    /// Point-in-time view of all matching records, newest first.
    pub fn snapshot(&self, predicate: &Predicate<T>) -> Result<Vec<T>, StoreError> {
        let records = self.lock_records()?;
        let mut snapshot: Vec<T> = records
            .values()
            .filter(|record| predicate.as_ref()(record))
            .cloned()
            .collect();
        sort_newest_first(&mut snapshot);
        Ok(snapshot)
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for MemoryStore<T> {
    async fn get(&self, id: &str) -> Result<T, StoreError> {
        let records = self.lock_records()?;
        records.get(id).cloned().ok_or_else(|| StoreError::NotFound {
            id: id.to_string(),
        })
    }

    async fn create(&self, mut record: T) -> Result<T, StoreError> {
        let mut records = self.lock_records()?;
        let id = record.id().to_string();
        if records.contains_key(&id) {
            return Err(StoreError::AlreadyExists { id });
        }
        record.set_version(1);
        record.touch(Utc::now());
        records.insert(id.clone(), record.clone());
        // Write-then-notify, inside the same critical section.
        self.feed.publish(None, &record);
        debug!(entity.id = %id, kind = %record.kind(), "record created");
        Ok(record)
    }

    async fn put(&self, mut next: T, expected_version: u64) -> Result<T, StoreError> {
        let mut records = self.lock_records()?;
        let id = next.id().to_string();
        let current = records.get(&id).ok_or_else(|| StoreError::NotFound {
            id: id.clone(),
        })?;
        if current.version() != expected_version {
            return Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
                stored: current.version(),
            });
        }
        let before = current.clone();
        next.set_version(expected_version + 1);
        next.touch(Utc::now());
        records.insert(id.clone(), next.clone());
        self.feed.publish(Some(&before), &next);
        debug!(
            entity.id = %id,
            kind = %next.kind(),
            version = next.version(),
            "record committed"
        );
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{LaundryRequest, LaundryStatus};
    use crate::feed::ChangeEvent;

    fn request(owner: &str) -> LaundryRequest {
        LaundryRequest::new(owner, vec!["2 shirts".to_string()], Utc::now(), None)
    }

    #[tokio::test]
    async fn create_assigns_version_one() {
        let store = MemoryStore::new();
        let created = store.create(request("stu-1")).await.unwrap();
        assert_eq!(created.version, 1);
        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn stale_put_changes_nothing() {
        let store = MemoryStore::new();
        let created = store.create(request("stu-1")).await.unwrap();

        let mut fresh = created.clone();
        fresh.status = LaundryStatus::InProcess;
        let committed = store.put(fresh, created.version).await.unwrap();
        assert_eq!(committed.version, 2);

        // Write based on the original read; the version check must fail
        // and the stored record must keep the committed state.
        let mut stale = created.clone();
        stale.status = LaundryStatus::Ready;
        let err = store.put(stale, created.version).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::VersionConflict {
                id: created.id.clone(),
                expected: 1,
                stored: 2,
            }
        );
        let stored = store.get(&created.id).await.unwrap();
        assert_eq!(stored.status, LaundryStatus::InProcess);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn subscribe_snapshot_excludes_later_events() {
        let store = MemoryStore::new();
        let first = store.create(request("stu-1")).await.unwrap();

        let (snapshot, mut sub) = store
            .subscribe(Arc::new(|_: &LaundryRequest| true))
            .unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, first.id);
        assert!(sub.try_next().is_none());

        let second = store.create(request("stu-2")).await.unwrap();
        match sub.try_next() {
            Some(ChangeEvent::Added(entity)) => assert_eq!(entity.id, second.id),
            other => panic!("expected Added, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery_synchronously() {
        let store = MemoryStore::new();
        let (_, sub) = store
            .subscribe(Arc::new(|_: &LaundryRequest| true))
            .unwrap();
        assert_eq!(store.subscriber_count(), 1);
        sub.unsubscribe();
        assert_eq!(store.subscriber_count(), 0);
        store.create(request("stu-1")).await.unwrap();
    }
}
