// DeskCoordinator - the operation surface the UI/controller layer
// calls. Composes the stores, the transition validator, and the claim
// arbitrator; every call takes the caller's session explicitly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, Instrument};

use crate::claims::ClaimArbitrator;
use crate::entities::{EntityKind, LaundryRequest, LaundryStatus, LostItem};
use crate::errors::CoreError;
use crate::feed::{Predicate, Subscription};
use crate::identity::{Role, Scope, Session};
use crate::store::{EntityStore, MemoryStore};
use crate::telemetry::{desk_span, generate_correlation_id};
use crate::transitions::{validate_laundry_transition, TransitionCheck};
use crate::views::{ItemStats, RequestStats, ViewProjection};

pub struct DeskCoordinator {
    requests: Arc<MemoryStore<LaundryRequest>>,
    items: Arc<MemoryStore<LostItem>>,
    arbitrator: ClaimArbitrator<MemoryStore<LostItem>>,
}

impl DeskCoordinator {
    pub fn new() -> Self {
        let items = Arc::new(MemoryStore::new());
        Self {
            requests: Arc::new(MemoryStore::new()),
            arbitrator: ClaimArbitrator::new(Arc::clone(&items)),
            items,
        }
    }

    fn request_predicate(scope: Scope) -> Predicate<LaundryRequest> {
        Arc::new(move |request| scope.allows_request(request))
    }

    fn item_predicate(scope: Scope) -> Predicate<LostItem> {
        Arc::new(move |item| scope.allows_item(item))
    }

    /// Create a laundry request owned by the session actor. Requests
    /// always start in `Pending`.
    pub async fn create_laundry_request(
        &self,
        session: &Session,
        items: Vec<String>,
        pickup_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<String, CoreError> {
        if session.role != Role::Requester {
            return Err(CoreError::PermissionDenied {
                role: session.role,
                action: "create a laundry request",
            });
        }
        if items.is_empty() {
            return Err(CoreError::Validation {
                reason: "a laundry request needs at least one item".to_string(),
            });
        }
        if items.iter().any(|item| item.trim().is_empty()) {
            return Err(CoreError::Validation {
                reason: "laundry item descriptions must not be blank".to_string(),
            });
        }

        let request = LaundryRequest::new(session.actor_id.clone(), items, pickup_at, notes);
        let created = self
            .requests
            .create(request)
            .await
            .map_err(|e| CoreError::from_store(e, EntityKind::LaundryRequest))?;
        info!(
            entity.id = %created.id,
            actor.id = %session.actor_id,
            correlation.id = %generate_correlation_id(),
            "laundry request created"
        );
        Ok(created.id)
    }

    /// Advance a laundry request along its linear lifecycle. Staff
    /// only. Re-requesting the current status is accepted without a
    /// write.
    pub async fn advance_laundry_status(
        &self,
        session: &Session,
        id: &str,
        requested: LaundryStatus,
        notes: Option<String>,
    ) -> Result<(), CoreError> {
        let span = desk_span("advance_laundry_status", &session.actor_id, Some(id));
        async {
            let current = self
                .requests
                .get(id)
                .await
                .map_err(|e| CoreError::from_store(e, EntityKind::LaundryRequest))?;

            match validate_laundry_transition(current.status, requested, session.role)? {
                TransitionCheck::Noop => {
                    info!(entity.id = %id, status = %requested, "status unchanged, no-op");
                    return Ok(());
                }
                TransitionCheck::Advance => {}
            }

            let mut next = current.clone();
            next.status = requested;
            if let Some(notes) = notes {
                next.notes = Some(notes);
            }
            if requested == LaundryStatus::Delivered {
                next.delivered_at = Some(Utc::now());
            }

            // A conflict here surfaces as ConflictStale; the caller
            // must re-read before retrying.
            let committed = self
                .requests
                .put(next, current.version)
                .await
                .map_err(|e| CoreError::from_store(e, EntityKind::LaundryRequest))?;
            info!(
                entity.id = %id,
                from = %current.status,
                to = %requested,
                version = committed.version,
                "laundry status advanced"
            );
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Report a found item. Staff only; items always start `Available`.
    pub async fn report_lost_item(
        &self,
        session: &Session,
        description: &str,
        category: &str,
        location: &str,
        photo_ref: Option<String>,
    ) -> Result<String, CoreError> {
        if !session.role.is_staff() {
            return Err(CoreError::PermissionDenied {
                role: session.role,
                action: "report a found item",
            });
        }
        for (field, value) in [
            ("description", description),
            ("category", category),
            ("location", location),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::Validation {
                    reason: format!("lost item {field} must not be empty"),
                });
            }
        }

        let item = LostItem::new(
            session.actor_id.clone(),
            description.trim(),
            category.trim(),
            location.trim(),
            photo_ref,
        );
        let created = self
            .items
            .create(item)
            .await
            .map_err(|e| CoreError::from_store(e, EntityKind::LostItem))?;
        info!(
            entity.id = %created.id,
            actor.id = %session.actor_id,
            category = %created.category,
            "lost item reported"
        );
        Ok(created.id)
    }

    /// Claim a found item for the session actor. At most one concurrent
    /// submitter succeeds.
    pub async fn submit_claim(
        &self,
        session: &Session,
        item_id: &str,
        justification: &str,
        contact_info: &str,
    ) -> Result<String, CoreError> {
        let span = desk_span("submit_claim", &session.actor_id, Some(item_id));
        self.arbitrator
            .submit_claim(session, item_id, justification, contact_info)
            .instrument(span)
            .await
    }

    /// Approve or reject the live claim on an item. Staff only.
    pub async fn decide_claim(
        &self,
        session: &Session,
        item_id: &str,
        approved: bool,
        notes: Option<String>,
    ) -> Result<(), CoreError> {
        let span = desk_span("decide_claim", &session.actor_id, Some(item_id));
        self.arbitrator
            .decide_claim(session, item_id, approved, notes)
            .instrument(span)
            .await
    }

    /// Fetch one request, honoring the session's visibility scope. Out
    /// of scope reads as `NotFound` rather than leaking existence.
    pub async fn get_request(
        &self,
        session: &Session,
        id: &str,
    ) -> Result<LaundryRequest, CoreError> {
        let request = self
            .requests
            .get(id)
            .await
            .map_err(|e| CoreError::from_store(e, EntityKind::LaundryRequest))?;
        if !Scope::for_session(session).allows_request(&request) {
            return Err(CoreError::NotFound {
                kind: EntityKind::LaundryRequest,
                id: id.to_string(),
            });
        }
        Ok(request)
    }

    pub async fn get_item(&self, session: &Session, id: &str) -> Result<LostItem, CoreError> {
        let item = self
            .items
            .get(id)
            .await
            .map_err(|e| CoreError::from_store(e, EntityKind::LostItem))?;
        if !Scope::for_session(session).allows_item(&item) {
            return Err(CoreError::NotFound {
                kind: EntityKind::LostItem,
                id: id.to_string(),
            });
        }
        Ok(item)
    }

    /// Open a live view over the requests visible to this session:
    /// snapshot first, then every subsequent matching mutation in
    /// per-entity commit order.
    pub fn subscribe_requests(
        &self,
        session: &Session,
    ) -> Result<(Vec<LaundryRequest>, Subscription<LaundryRequest>), CoreError> {
        let scope = Scope::for_session(session);
        self.requests
            .subscribe(Self::request_predicate(scope))
            .map_err(|e| CoreError::from_store(e, EntityKind::LaundryRequest))
    }

    /// Open a live view over the lost-and-found board. Items are
    /// visible to every role so they can be claimed.
    pub fn subscribe_items(
        &self,
        session: &Session,
    ) -> Result<(Vec<LostItem>, Subscription<LostItem>), CoreError> {
        let scope = Scope::for_session(session);
        self.items
            .subscribe(Self::item_predicate(scope))
            .map_err(|e| CoreError::from_store(e, EntityKind::LostItem))
    }

    /// Point-in-time per-status counters for the session's request
    /// scope.
    pub fn request_counters(&self, session: &Session) -> Result<RequestStats, CoreError> {
        let scope = Scope::for_session(session);
        let snapshot = self
            .requests
            .snapshot(&Self::request_predicate(scope))
            .map_err(|e| CoreError::from_store(e, EntityKind::LaundryRequest))?;
        Ok(ViewProjection::from_snapshot(snapshot).stats())
    }

    pub fn item_counters(&self, session: &Session) -> Result<ItemStats, CoreError> {
        let scope = Scope::for_session(session);
        let snapshot = self
            .items
            .snapshot(&Self::item_predicate(scope))
            .map_err(|e| CoreError::from_store(e, EntityKind::LostItem))?;
        Ok(ViewProjection::from_snapshot(snapshot).stats())
    }
}

impl Default for DeskCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
