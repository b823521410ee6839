// Change Feed - fans committed mutations out to any number of scoped
// live subscriptions. Each subscriber gets its own unbounded channel so
// a slow consumer never blocks commits or other subscribers, and
// per-entity commit order is preserved as enqueue order.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::entities::Entity;

/// Scope predicate deciding which entities a subscription sees.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A mutation delivered to a live subscription.
///
/// `Added`/`Removed` also fire when a mutation moves an entity across
/// the subscription's predicate boundary, not just on create.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent<T> {
    Added(T),
    Updated(T),
    Removed { id: String },
}

impl<T: Entity> ChangeEvent<T> {
    pub fn entity_id(&self) -> &str {
        match self {
            ChangeEvent::Added(entity) | ChangeEvent::Updated(entity) => entity.id(),
            ChangeEvent::Removed { id } => id,
        }
    }
}

struct FeedSlot<T> {
    id: Uuid,
    predicate: Predicate<T>,
    tx: mpsc::UnboundedSender<ChangeEvent<T>>,
}

/// Fan-out registry. The store publishes into it while holding its
/// record lock, which is what makes write-then-notify atomic.
pub struct ChangeFeed<T> {
    slots: Mutex<Vec<FeedSlot<T>>>,
}

impl<T: Entity> ChangeFeed<T> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, Vec<FeedSlot<T>>> {
        // No code path panics while holding this lock; recover anyway.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a subscriber. Callers must hold whatever lock makes the
    /// accompanying snapshot atomic with this registration.
    pub(crate) fn register(
        &self,
        predicate: Predicate<T>,
    ) -> (Uuid, mpsc::UnboundedReceiver<ChangeEvent<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.lock_slots().push(FeedSlot { id, predicate, tx });
        debug!(subscription = %id, "feed subscription registered");
        (id, rx)
    }

    pub(crate) fn remove(&self, id: Uuid) {
        self.lock_slots().retain(|slot| slot.id != id);
        debug!(subscription = %id, "feed subscription removed");
    }

    /// Fan a committed mutation out to every matching subscriber.
    ///
    /// `before` is the entity as stored prior to the write (`None` on
    /// create). A subscriber whose predicate matched before but not
    /// after gets `Removed`; the inverse gets `Added`.
    pub(crate) fn publish(&self, before: Option<&T>, after: &T) {
        let mut slots = self.lock_slots();
        slots.retain(|slot| {
            let predicate = slot.predicate.as_ref();
            let matched_before = before.map(predicate).unwrap_or(false);
            let matched_after = predicate(after);
            let event = match (matched_before, matched_after) {
                (false, true) => ChangeEvent::Added(after.clone()),
                (true, true) => ChangeEvent::Updated(after.clone()),
                (true, false) => ChangeEvent::Removed {
                    id: after.id().to_string(),
                },
                (false, false) => return true,
            };
            // A closed channel means the receiver was dropped without
            // unsubscribing; reap the slot.
            slot.tx.send(event).is_ok()
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_slots().len()
    }
}

impl<T: Entity> Default for ChangeFeed<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Live subscription handle. Dropping it detaches the slot; prefer
/// `unsubscribe` to make the cut-off explicit and synchronous.
pub struct Subscription<T: Entity> {
    id: Uuid,
    rx: mpsc::UnboundedReceiver<ChangeEvent<T>>,
    feed: Arc<ChangeFeed<T>>,
    detached: bool,
}

impl<T: Entity> Subscription<T> {
    pub(crate) fn new(
        id: Uuid,
        rx: mpsc::UnboundedReceiver<ChangeEvent<T>>,
        feed: Arc<ChangeFeed<T>>,
    ) -> Self {
        Self {
            id,
            rx,
            feed,
            detached: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the next event, in per-entity commit order. Returns
    /// `None` once the sending side is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent<T>> {
        self.rx.recv().await
    }

    /// Non-blocking poll for a buffered event.
    pub fn try_next(&mut self) -> Option<ChangeEvent<T>> {
        self.rx.try_recv().ok()
    }

    /// Detach synchronously. Once this returns, the slot is gone and no
    /// further event can reach this handle; buffered events die with
    /// the consumed receiver.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if !self.detached {
            self.detached = true;
            self.feed.remove(self.id);
        }
    }
}

impl<T: Entity> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.detach();
    }
}
